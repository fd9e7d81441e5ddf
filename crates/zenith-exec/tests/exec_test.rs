//! Integration tests for callable and observable execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_stream::stream;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use zenith_component::{
  Action, ActionError, CallContext, Component, ComponentSpec, ParameterKind, ParameterSpec,
  PortSpec, new_component,
};
use zenith_exec::{
  Channel, ComponentError, Emitter, Event, Values, new_callable_component, new_observable_component,
};
use zenith_schema::Schema;

fn values(value: Value) -> Values {
  value.as_object().expect("test values must be an object").clone()
}

fn output(value: u64) -> Result<Values, ActionError> {
  Ok(values(json!({ "value": value })))
}

/// Streams `0..limit`, raising `tick` after each value and stopping on `stop`.
fn count_up() -> Component {
  let spec = ComponentSpec::new("Count")
    .with_input("limit", ParameterSpec::new(Schema::integer()))
    .with_output("value", ParameterSpec::new(Schema::integer()))
    .with_inlet("stop", PortSpec::new())
    .with_outlet("tick", PortSpec::new());

  new_component(spec).bind(Action::stream(|ctx: CallContext| {
    let stop = ctx.inlet_flag("stop");
    let limit = ctx.input("limit").and_then(Value::as_u64).unwrap_or(0);
    stream! {
      for value in 0..limit {
        if stop.load(Ordering::SeqCst) {
          break;
        }
        yield output(value);
        ctx.notify_outlet("tick");
      }
    }
  }))
}

/// Doubles `x` after a short wait.
fn double() -> Component {
  let spec = ComponentSpec::new("Double")
    .with_input("x", ParameterSpec::new(Schema::number()))
    .with_output("y", ParameterSpec::new(Schema::number()));

  new_component(spec).bind(Action::deferred(|ctx: CallContext| async move {
    tokio::time::sleep(Duration::from_millis(5)).await;
    let x = ctx
      .input("x")
      .and_then(Value::as_f64)
      .ok_or_else(|| ActionError::msg("x is not a number"))?;
    Ok::<_, ActionError>(Some(values(json!({ "y": x * 2.0, "ignored": true }))))
  }))
}

fn failing() -> Component {
  new_component(ComponentSpec::new("Failing"))
    .bind(Action::immediate(|_| Err(ActionError::msg("boom"))))
}

fn record(emitter: &Emitter, channels: &[Channel]) -> mpsc::UnboundedReceiver<Event> {
  let (tx, rx) = mpsc::unbounded_channel();
  for channel in channels {
    emitter.forward(channel.clone(), tx.clone());
  }
  rx
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<String> {
  let mut names = Vec::new();
  while let Ok(event) = rx.try_recv() {
    names.push(event.channel().to_string());
  }
  names
}

fn all_channels() -> Vec<Channel> {
  vec![
    Channel::OutletRaised,
    Channel::Outlet("tick".to_string()),
    Channel::Inlet("stop".to_string()),
    Channel::Output,
    Channel::Error,
    Channel::End,
  ]
}

#[tokio::test]
async fn test_callable_deferred_output_has_declared_keys_only() {
  let callable = new_callable_component(double());

  let result = callable.call(json!({ "x": 2.5 })).await.unwrap();

  assert_eq!(result, Some(values(json!({ "y": 5.0 }))));
}

#[tokio::test]
async fn test_callable_stream_returns_last_output() {
  let callable = new_callable_component(count_up());

  let result = callable.call(json!({ "limit": 3 })).await.unwrap();

  assert_eq!(result, Some(values(json!({ "value": 2 }))));
}

#[tokio::test]
async fn test_callable_empty_stream_returns_none() {
  let callable = new_callable_component(count_up());

  let result = callable.call(json!({ "limit": 0 })).await.unwrap();

  assert!(result.is_none());
}

#[tokio::test]
async fn test_callable_rejects_invalid_inputs() {
  let callable = new_callable_component(double());

  let err = callable.call(json!({ "x": "2" })).await.unwrap_err();
  assert!(matches!(
    err,
    ComponentError::InvalidParameter { kind: ParameterKind::Inputs, ref key, .. } if key == "x"
  ));

  let err = callable.call(Value::Null).await.unwrap_err();
  assert!(matches!(err, ComponentError::MissingValues { .. }));

  let err = callable.call(json!([2])).await.unwrap_err();
  assert!(matches!(err, ComponentError::InvalidValues { .. }));
}

#[tokio::test]
async fn test_callable_rejects_values_for_undeclared_inputs() {
  let callable = new_callable_component(failing());

  let err = callable.call(json!({ "x": 1 })).await.unwrap_err();

  assert!(matches!(err, ComponentError::UnexpectedValues { .. }));
  assert!(err.is_validation());
}

#[tokio::test]
async fn test_callable_body_failure() {
  let callable = new_callable_component(failing());

  let err = callable.call(Value::Null).await.unwrap_err();

  assert!(matches!(err, ComponentError::BodyFailure { .. }));
  assert_eq!(err.to_string(), "component (Failing) action failed: boom");
  assert_eq!(err.component(), "Failing");
}

#[tokio::test]
async fn test_every_streamed_output_is_validated() {
  let spec = ComponentSpec::new("Drift").with_output("value", ParameterSpec::new(Schema::integer()));
  let component = new_component(spec).bind(Action::stream(|_| {
    futures::stream::iter(vec![
      output(1),
      Ok(values(json!({ "value": "two" }))),
      output(3),
    ])
  }));

  let err = new_callable_component(component)
    .call(Value::Null)
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    ComponentError::InvalidParameter { kind: ParameterKind::Outputs, .. }
  ));
}

#[tokio::test]
async fn test_observable_stream_event_order() {
  let (emitter, counter) = new_observable_component(count_up());
  let mut rx = record(&emitter, &all_channels());

  let result = counter.call(json!({ "limit": 2 })).await.unwrap();

  assert_eq!(result, Some(values(json!({ "value": 1 }))));
  assert_eq!(
    drain(&mut rx),
    vec![
      "output",
      "outlet",
      "outlet:tick",
      "output",
      "outlet",
      "outlet:tick",
      "end",
    ]
  );
  assert!(emitter.channels().is_empty());
}

#[tokio::test]
async fn test_observable_output_returned_even_when_not_observed() {
  let (emitter, counter) = new_observable_component(count_up());
  let mut rx = record(&emitter, &[Channel::End]);

  let result = counter.call(json!({ "limit": 4 })).await.unwrap();

  assert_eq!(result, Some(values(json!({ "value": 3 }))));
  assert_eq!(drain(&mut rx), vec!["end"]);
}

#[tokio::test]
async fn test_observable_error_without_listener_is_returned() {
  let (emitter, component) = new_observable_component(failing());
  let mut rx = record(&emitter, &[Channel::End]);

  let err = component.call(Value::Null).await.unwrap_err();

  assert!(matches!(err, ComponentError::BodyFailure { .. }));
  assert_eq!(drain(&mut rx), vec!["end"]);
  assert!(emitter.channels().is_empty());
}

#[tokio::test]
async fn test_observable_error_with_listener_resolves() {
  let (emitter, component) = new_observable_component(failing());
  let mut rx = record(&emitter, &[Channel::Error, Channel::End]);

  let result = component.call(Value::Null).await.unwrap();
  assert!(result.is_none());

  match rx.try_recv() {
    Ok(Event::Error(cause)) => assert_eq!(cause.to_string(), "component (Failing) action failed: boom"),
    other => panic!("expected an error event, got {:?}", other),
  }
  assert!(matches!(rx.try_recv(), Ok(Event::End)));
}

#[tokio::test]
async fn test_observable_input_failure_goes_to_error_listener() {
  let (emitter, component) = new_observable_component(double());
  let mut rx = record(&emitter, &[Channel::Output, Channel::Error, Channel::End]);

  let result = component.call(json!({ "x": false })).await.unwrap();

  assert!(result.is_none());
  assert_eq!(drain(&mut rx), vec!["error", "end"]);
}

#[tokio::test]
async fn test_observable_inlet_stops_stream() {
  let (emitter, counter) = new_observable_component(count_up());
  let outputs = Arc::new(AtomicUsize::new(0));

  let handle = counter.clone();
  let seen = outputs.clone();
  emitter.on(Channel::Output, move |event| {
    seen.fetch_add(1, Ordering::SeqCst);
    if let Event::Output(values) = event {
      if values["value"] == json!(1) {
        handle.notify_inlet("stop");
      }
    }
  });

  let result = counter.call(json!({ "limit": 10 })).await.unwrap();

  assert_eq!(outputs.load(Ordering::SeqCst), 2);
  assert_eq!(result, Some(values(json!({ "value": 1 }))));
}

#[tokio::test]
async fn test_notify_inlet_outside_call_is_noop() {
  let (emitter, counter) = new_observable_component(count_up());

  counter.notify_inlet("stop");

  assert!(emitter.channels().is_empty());
  let result = counter.call(json!({ "limit": 1 })).await.unwrap();
  assert_eq!(result, Some(values(json!({ "value": 0 }))));
}

#[tokio::test]
async fn test_end_fires_once_and_listeners_are_removed() {
  let (emitter, counter) = new_observable_component(count_up());
  let ends = Arc::new(AtomicUsize::new(0));
  let seen = ends.clone();
  emitter.on(Channel::End, move |_| {
    seen.fetch_add(1, Ordering::SeqCst);
  });

  counter.call(json!({ "limit": 3 })).await.unwrap();
  assert_eq!(ends.load(Ordering::SeqCst), 1);
  assert!(emitter.channels().is_empty());

  // Listeners do not carry over to the next call.
  counter.call(json!({ "limit": 3 })).await.unwrap();
  assert_eq!(ends.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeated_calls_produce_identical_events() {
  let (first_emitter, first) = new_observable_component(count_up());
  let mut first_rx = record(&first_emitter, &all_channels());
  first.call(json!({ "limit": 3 })).await.unwrap();

  let (second_emitter, second) = new_observable_component(count_up());
  let mut second_rx = record(&second_emitter, &all_channels());
  second.call(json!({ "limit": 3 })).await.unwrap();

  // Same pair, subscribed again.
  let mut again_rx = record(&second_emitter, &all_channels());
  second.call(json!({ "limit": 3 })).await.unwrap();

  let expected = drain(&mut first_rx);
  assert_eq!(expected.len(), 3 * 3 + 1);
  assert_eq!(drain(&mut second_rx), expected);
  assert_eq!(drain(&mut again_rx), expected);
}

#[tokio::test]
async fn test_concurrent_call_on_same_pair_is_rejected() {
  let (_emitter, doubler) = new_observable_component(double());

  let (a, b) = tokio::join!(
    doubler.call(json!({ "x": 1 })),
    doubler.call(json!({ "x": 2 }))
  );

  assert_eq!(a.unwrap(), Some(values(json!({ "y": 2.0 }))));
  assert!(matches!(b, Err(ComponentError::CallInProgress { .. })));
  assert!(!doubler.is_running());
}

#[tokio::test]
async fn test_separate_pairs_run_concurrently() {
  let (_, a) = new_observable_component(double());
  let (_, b) = new_observable_component(double());

  let (ra, rb) = tokio::join!(a.call(json!({ "x": 1 })), b.call(json!({ "x": 2 })));

  assert_eq!(ra.unwrap(), Some(values(json!({ "y": 2.0 }))));
  assert_eq!(rb.unwrap(), Some(values(json!({ "y": 4.0 }))));
}

#[tokio::test]
async fn test_dropped_call_is_torn_down() {
  let spec = ComponentSpec::new("Stalled").with_outlet("never", PortSpec::new());
  let stalled = new_component(spec).bind(Action::stream(|_| futures::stream::pending()));
  let (emitter, component) = new_observable_component(stalled);
  let mut rx = record(&emitter, &[Channel::Output, Channel::End]);

  let timed_out = tokio::time::timeout(Duration::from_millis(20), component.call(Value::Null)).await;

  assert!(timed_out.is_err());
  assert!(emitter.channels().is_empty());
  assert!(!component.is_running());
  // A call that never concluded publishes no end event.
  assert!(drain(&mut rx).is_empty());
}
