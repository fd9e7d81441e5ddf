use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use zenith_component::{Component, port_channels};
use zenith_exec::{Channel, Event, new_callable_component, new_observable_component};

/// Zenith - run components and watch what they do
#[derive(Parser)]
#[command(name = "zenith")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log debug output to stderr (overrides RUST_LOG)
  #[arg(long, short, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List the available components
  List,

  /// Print a component's declaration as JSON
  Describe {
    /// Component label (case-insensitive)
    component: String,
  },

  /// Run a component with inputs read from stdin
  Run {
    /// Component label (case-insensitive)
    component: String,

    /// Print every call event as a JSON line
    #[arg(long)]
    observe: bool,

    /// Notify an inlet right after the output with the given index
    /// (`name@index`, e.g. `break@2`). Implies --observe.
    #[arg(long = "inlet", value_name = "NAME@INDEX", value_parser = parse_inlet)]
    inlets: Vec<InletTrigger>,
  },
}

#[derive(Debug, Clone, PartialEq)]
struct InletTrigger {
  name: String,
  after_output: usize,
}

fn parse_inlet(arg: &str) -> Result<InletTrigger, String> {
  let (name, index) = arg
    .rsplit_once('@')
    .ok_or_else(|| format!("expected NAME@INDEX, got '{}'", arg))?;
  if name.is_empty() {
    return Err(format!("missing inlet name in '{}'", arg));
  }
  let after_output = index
    .parse()
    .map_err(|_| format!("invalid output index '{}'", index))?;
  Ok(InletTrigger {
    name: name.to_string(),
    after_output,
  })
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match cli.command {
    Some(Commands::List) => list(),
    Some(Commands::Describe { component }) => describe(&component)?,
    Some(Commands::Run {
      component,
      observe,
      inlets,
    }) => {
      run(&component, observe, inlets)?;
    }
    None => {
      println!("zenith - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .init();
}

fn find_component(name: &str) -> Result<Component> {
  zenith_std::find(name).with_context(|| format!("component '{}' not found", name))
}

fn list() {
  for component in zenith_std::catalog() {
    let doc = component.spec().doc.as_deref().unwrap_or("");
    println!("{:<12} {}", component.label(), doc);
  }
}

fn describe(name: &str) -> Result<()> {
  let component = find_component(name)?;
  println!("{}", serde_json::to_string_pretty(component.spec())?);
  Ok(())
}

fn run(name: &str, observe: bool, inlets: Vec<InletTrigger>) -> Result<()> {
  let component = find_component(name)?;
  let inputs = read_inputs_from_stdin()?;
  debug!(component = %component.label(), inputs = %inputs, "inputs_read");

  let rt = tokio::runtime::Runtime::new()?;
  if observe || !inlets.is_empty() {
    rt.block_on(async { run_observed(component, inputs, inlets).await })
  } else {
    rt.block_on(async { run_callable(component, inputs).await })
  }
}

async fn run_callable(component: Component, inputs: Value) -> Result<()> {
  let label = component.label().to_string();
  let output = new_callable_component(component)
    .call(inputs)
    .await
    .with_context(|| format!("failed to run component '{}'", label))?;

  let output = output.map(Value::Object).unwrap_or(Value::Null);
  println!("{}", serde_json::to_string_pretty(&output)?);
  Ok(())
}

async fn run_observed(component: Component, inputs: Value, inlets: Vec<InletTrigger>) -> Result<()> {
  let label = component.label().to_string();
  let (emitter, observable) = new_observable_component(component);

  let (tx, mut rx) = mpsc::unbounded_channel();
  let mut channels = vec![Channel::OutletRaised, Channel::Output, Channel::Error, Channel::End];
  channels.extend(port_channels(observable.component().spec()));
  for channel in channels {
    emitter.forward(channel, tx.clone());
  }
  drop(tx);

  // Registered after the forwarders so an output is printed before the inlet
  // it triggers.
  if !inlets.is_empty() {
    let produced = Arc::new(AtomicUsize::new(0));
    let handle = observable.clone();
    emitter.on(Channel::Output, move |_| {
      let index = produced.fetch_add(1, Ordering::SeqCst);
      for trigger in inlets.iter().filter(|t| t.after_output == index) {
        handle.notify_inlet(&trigger.name);
      }
    });
  }

  let result = observable
    .call(inputs)
    .await
    .with_context(|| format!("failed to run component '{}'", label));

  // Teardown dropped every forwarder, so the channel drains and closes.
  let mut failed = false;
  while let Some(event) = rx.recv().await {
    failed |= matches!(event, Event::Error(_));
    println!("{}", serde_json::to_string(&event_line(&event))?);
  }

  result?;
  if failed {
    bail!("component '{}' failed", label);
  }
  Ok(())
}

fn event_line(event: &Event) -> Value {
  let channel = event.channel().to_string();
  match event {
    Event::OutletRaised(outlet) => json!({ "event": channel, "outlet": outlet }),
    Event::Output(values) => json!({ "event": channel, "values": values }),
    Event::Error(cause) => json!({ "event": channel, "message": cause.to_string() }),
    Event::Outlet(_) | Event::Inlet(_) | Event::End => json!({ "event": channel }),
  }
}

fn read_inputs_from_stdin() -> Result<Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    // No stdin pipe, run without inputs
    Ok(Value::Null)
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read inputs from stdin")?;

    if input.trim().is_empty() {
      Ok(Value::Null)
    } else {
      serde_json::from_str(&input).context("failed to parse inputs JSON from stdin")
    }
  }
}
