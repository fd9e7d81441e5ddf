//! Call events and the typed dispatcher observers subscribe to.
//!
//! An [`Emitter`] is scoped to calls: the engine publishes into it while a
//! call runs and removes every listener once the call is over, so observers
//! must subscribe again before each call.
//!
//! Publishing is gated by the caller: the engine and [`CallContext`] check
//! [`Emitter::has_subscribers`] first, so nothing is built or published for
//! channels nobody listens to.
//!
//! [`CallContext`]: crate::CallContext

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::ComponentError;
use crate::parameters::Values;

/// The closed set of channels an emitter dispatches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
  /// Any outlet was raised; the payload is the outlet name.
  OutletRaised,
  /// A specific outlet was raised.
  Outlet(String),
  /// The host notified a specific inlet.
  Inlet(String),
  /// The call produced a validated output.
  Output,
  /// The call failed.
  Error,
  /// The call concluded.
  End,
}

impl fmt::Display for Channel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Channel::OutletRaised => f.write_str("outlet"),
      Channel::Outlet(name) => write!(f, "outlet:{}", name),
      Channel::Inlet(name) => write!(f, "inlet:{}", name),
      Channel::Output => f.write_str("output"),
      Channel::Error => f.write_str("error"),
      Channel::End => f.write_str("end"),
    }
  }
}

/// An event published during a call.
#[derive(Debug, Clone)]
pub enum Event {
  OutletRaised(String),
  Outlet(String),
  Inlet(String),
  Output(Values),
  Error(Arc<ComponentError>),
  End,
}

impl Event {
  /// The channel this event is dispatched on.
  pub fn channel(&self) -> Channel {
    match self {
      Event::OutletRaised(_) => Channel::OutletRaised,
      Event::Outlet(name) => Channel::Outlet(name.clone()),
      Event::Inlet(name) => Channel::Inlet(name.clone()),
      Event::Output(_) => Channel::Output,
      Event::Error(_) => Channel::Error,
      Event::End => Channel::End,
    }
  }
}

/// A subscriber callback.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by [`Emitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
  id: ListenerId,
  listener: Listener,
  once: bool,
}

#[derive(Default)]
struct Registry {
  next_id: u64,
  // Channels without listeners are removed, so the key set is exactly the
  // set of subscribed channels.
  channels: BTreeMap<Channel, Vec<Registration>>,
}

/// A typed event dispatcher.
///
/// Cloning is shallow: clones share the same listeners.
#[derive(Clone, Default)]
pub struct Emitter {
  registry: Arc<Mutex<Registry>>,
}

impl Emitter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Subscribe `listener` to `channel`.
  pub fn on<F>(&self, channel: Channel, listener: F) -> ListenerId
  where
    F: Fn(&Event) + Send + Sync + 'static,
  {
    self.register(channel, Arc::new(listener), false)
  }

  /// Subscribe `listener` to the next event on `channel` only.
  pub fn once<F>(&self, channel: Channel, listener: F) -> ListenerId
  where
    F: Fn(&Event) + Send + Sync + 'static,
  {
    self.register(channel, Arc::new(listener), true)
  }

  /// Forward every event on `channel` into an unbounded channel.
  ///
  /// Useful for consuming events asynchronously or asserting on their order.
  pub fn forward(&self, channel: Channel, sender: mpsc::UnboundedSender<Event>) -> ListenerId {
    self.on(channel, move |event| {
      // Ignore send errors - receiver may have been dropped
      let _ = sender.send(event.clone());
    })
  }

  /// Remove one listener. Returns whether it was still registered.
  pub fn off(&self, id: ListenerId) -> bool {
    let mut registry = self.registry.lock();
    let mut removed = false;
    registry.channels.retain(|_, registrations| {
      let before = registrations.len();
      registrations.retain(|r| r.id != id);
      removed |= registrations.len() != before;
      !registrations.is_empty()
    });
    removed
  }

  pub fn has_subscribers(&self, channel: &Channel) -> bool {
    self.registry.lock().channels.contains_key(channel)
  }

  pub fn listener_count(&self, channel: &Channel) -> usize {
    self
      .registry
      .lock()
      .channels
      .get(channel)
      .map_or(0, Vec::len)
  }

  /// Every channel with at least one listener.
  pub fn channels(&self) -> Vec<Channel> {
    self.registry.lock().channels.keys().cloned().collect()
  }

  /// Dispatch `event` to the listeners of its channel, in subscription order.
  ///
  /// Listeners run synchronously, without the registry lock held, so they may
  /// subscribe, unsubscribe or publish themselves. Returns whether any
  /// listener was called.
  pub fn publish(&self, event: Event) -> bool {
    let channel = event.channel();
    let listeners = {
      let mut registry = self.registry.lock();
      let Some(registrations) = registry.channels.get_mut(&channel) else {
        return false;
      };
      let listeners: Vec<Listener> = registrations
        .iter()
        .map(|r| Arc::clone(&r.listener))
        .collect();
      registrations.retain(|r| !r.once);
      if registrations.is_empty() {
        registry.channels.remove(&channel);
      }
      listeners
    };

    for listener in &listeners {
      listener(&event);
    }
    !listeners.is_empty()
  }

  /// Remove every listener from every channel.
  pub fn clear(&self) {
    self.registry.lock().channels.clear();
  }

  fn register(&self, channel: Channel, listener: Listener, once: bool) -> ListenerId {
    let mut registry = self.registry.lock();
    let id = ListenerId(registry.next_id);
    registry.next_id += 1;
    registry
      .channels
      .entry(channel)
      .or_default()
      .push(Registration { id, listener, once });
    id
  }
}

impl fmt::Debug for Emitter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Emitter")
      .field("channels", &self.channels())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn counter(emitter: &Emitter, channel: Channel) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    emitter.on(channel, move |_| {
      c.fetch_add(1, Ordering::SeqCst);
    });
    count
  }

  #[test]
  fn test_channel_display() {
    assert_eq!(Channel::OutletRaised.to_string(), "outlet");
    assert_eq!(Channel::Outlet("true".into()).to_string(), "outlet:true");
    assert_eq!(Channel::Inlet("break".into()).to_string(), "inlet:break");
    assert_eq!(Channel::Output.to_string(), "output");
    assert_eq!(Channel::End.to_string(), "end");
  }

  #[test]
  fn test_publish_without_subscribers() {
    let emitter = Emitter::new();
    assert!(!emitter.has_subscribers(&Channel::End));
    assert!(!emitter.publish(Event::End));
  }

  #[test]
  fn test_on_receives_every_event() {
    let emitter = Emitter::new();
    let count = counter(&emitter, Channel::End);

    assert!(emitter.publish(Event::End));
    assert!(emitter.publish(Event::End));
    assert_eq!(count.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_once_unsubscribes_after_first_event() {
    let emitter = Emitter::new();
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    emitter.once(Channel::Outlet("true".into()), move |_| {
      c.fetch_add(1, Ordering::SeqCst);
    });

    emitter.publish(Event::Outlet("true".into()));
    emitter.publish(Event::Outlet("true".into()));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(emitter.channels().is_empty());
  }

  #[test]
  fn test_channels_are_isolated() {
    let emitter = Emitter::new();
    let specific = counter(&emitter, Channel::Outlet("a".into()));

    emitter.publish(Event::Outlet("b".into()));
    emitter.publish(Event::OutletRaised("a".into()));
    assert_eq!(specific.load(Ordering::SeqCst), 0);

    emitter.publish(Event::Outlet("a".into()));
    assert_eq!(specific.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_off_and_clear() {
    let emitter = Emitter::new();
    let id = emitter.on(Channel::Output, |_| {});
    emitter.on(Channel::End, |_| {});
    assert_eq!(emitter.channels(), vec![Channel::Output, Channel::End]);

    assert!(emitter.off(id));
    assert!(!emitter.off(id));
    assert_eq!(emitter.channels(), vec![Channel::End]);

    emitter.clear();
    assert!(emitter.channels().is_empty());
    assert_eq!(emitter.listener_count(&Channel::End), 0);
  }

  #[test]
  fn test_listener_can_publish_reentrantly() {
    let emitter = Emitter::new();
    let inlet = counter(&emitter, Channel::Inlet("break".into()));

    let inner = emitter.clone();
    emitter.on(Channel::Output, move |_| {
      inner.publish(Event::Inlet("break".into()));
    });

    emitter.publish(Event::Output(Values::new()));
    assert_eq!(inlet.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_forward_preserves_order() {
    let emitter = Emitter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    emitter.forward(Channel::OutletRaised, tx.clone());
    emitter.forward(Channel::End, tx);

    emitter.publish(Event::OutletRaised("first".into()));
    emitter.publish(Event::End);

    assert!(matches!(rx.recv().await, Some(Event::OutletRaised(name)) if name == "first"));
    assert!(matches!(rx.recv().await, Some(Event::End)));
  }
}
