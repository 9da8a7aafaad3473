//! Event listeners
//!
//! Three event kinds are broadcast by a [`Session`]: key pressed, line
//! changed and line entered. Listeners of one kind run in registration order
//! and the first one returning something other than [`Status::Ok`] stops the
//! broadcast; that status is what the read loop acts on.
//!
//! Closures with the matching signature are listeners; anything else can
//! implement the trait and be shared between several registrations.

use std::collections::HashMap;
use std::rc::Rc;

use super::cursor::Cursor;
use super::io::Result;
use super::key::Key;
use super::line::Line;
use super::session::Session;

/// Control flow requested by a listener
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Fall through to the next listener, then to default processing
    Ok,
    /// Skip the rest of this loop iteration
    Continue,
    /// End the current read (or the session, for line-entered)
    Break,
}

pub trait KeyPressedListener {
    fn invoke(&self, key: &Key, line: &mut Line, cursor: &mut Cursor, session: &mut Session) -> Result<Status>;
}

impl<F> KeyPressedListener for F
where
    F: Fn(&Key, &mut Line, &mut Cursor, &mut Session) -> Result<Status>,
{
    fn invoke(&self, key: &Key, line: &mut Line, cursor: &mut Cursor, session: &mut Session) -> Result<Status> {
        self(key, line, cursor, session)
    }
}

pub trait LineChangedListener {
    fn invoke(&self, content: &str, line: &mut Line, cursor: &mut Cursor, session: &mut Session) -> Result<Status>;
}

impl<F> LineChangedListener for F
where
    F: Fn(&str, &mut Line, &mut Cursor, &mut Session) -> Result<Status>,
{
    fn invoke(&self, content: &str, line: &mut Line, cursor: &mut Cursor, session: &mut Session) -> Result<Status> {
        self(content, line, cursor, session)
    }
}

pub trait LineEnteredListener {
    fn invoke(&self, content: &str, session: &mut Session) -> Result<Status>;
}

impl<F> LineEnteredListener for F
where
    F: Fn(&str, &mut Session) -> Result<Status>,
{
    fn invoke(&self, content: &str, session: &mut Session) -> Result<Status> {
        self(content, session)
    }
}

/// Listener registrations of one session
#[derive(Default)]
pub struct Listeners {
    key_pressed: HashMap<Key, Vec<Rc<dyn KeyPressedListener>>>,
    line_changed: Vec<Rc<dyn LineChangedListener>>,
    line_entered: Vec<Rc<dyn LineEnteredListener>>,
}

impl Listeners {
    pub fn add_key_pressed(&mut self, key: Key, listener: Rc<dyn KeyPressedListener>) {
        self.key_pressed.entry(key).or_default().push(listener);
    }

    pub fn remove_key_pressed(&mut self, key: &Key) {
        if let Some(bucket) = self.key_pressed.get_mut(key) {
            bucket.clear();
        }
    }

    /// Snapshot of the listeners bound to exactly `key`
    pub fn key_pressed(&self, key: &Key) -> Vec<Rc<dyn KeyPressedListener>> {
        self.key_pressed.get(key).cloned().unwrap_or_default()
    }

    pub fn add_line_changed(&mut self, listener: Rc<dyn LineChangedListener>) {
        self.line_changed.push(listener);
    }

    pub fn remove_line_changed(&mut self) {
        self.line_changed.clear();
    }

    pub fn line_changed(&self) -> Vec<Rc<dyn LineChangedListener>> {
        self.line_changed.clone()
    }

    pub fn add_line_entered(&mut self, listener: Rc<dyn LineEnteredListener>) {
        self.line_entered.push(listener);
    }

    pub fn remove_line_entered(&mut self) {
        self.line_entered.clear();
    }

    pub fn line_entered(&self) -> Vec<Rc<dyn LineEnteredListener>> {
        self.line_entered.clone()
    }
}

/// Invoke listeners in order until one returns a non-`Ok` status
pub fn dispatch<L: ?Sized>(listeners: &[Rc<L>], mut invoke: impl FnMut(&L) -> Result<Status>) -> Result<Status> {
    for listener in listeners {
        let status = invoke(&**listener)?;
        if status != Status::Ok {
            return Ok(status);
        }
    }
    Ok(Status::Ok)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::core::io::TermError;

    type Probe = dyn Fn() -> Result<Status>;

    fn probes(statuses: &[Status], calls: &Rc<RefCell<Vec<usize>>>) -> Vec<Rc<Probe>> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let calls = Rc::clone(calls);
                let status = *status;
                Rc::new(move || -> Result<Status> {
                    calls.borrow_mut().push(i);
                    Ok(status)
                }) as Rc<Probe>
            })
            .collect()
    }

    #[test]
    fn test_dispatch_runs_all_when_ok() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let listeners = probes(&[Status::Ok, Status::Ok, Status::Ok], &calls);
        assert_eq!(dispatch(&listeners, |l| l()).unwrap(), Status::Ok);
        assert_eq!(*calls.borrow(), [0, 1, 2]);
    }

    #[test]
    fn test_dispatch_stops_at_first_non_ok() {
        for stop in [Status::Break, Status::Continue] {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let listeners = probes(&[Status::Ok, stop, Status::Ok, Status::Break], &calls);
            assert_eq!(dispatch(&listeners, |l| l()).unwrap(), stop);
            assert_eq!(*calls.borrow(), [0, 1]);
        }
    }

    #[test]
    fn test_dispatch_propagates_errors() {
        let failing = || -> Result<Status> { Err(TermError::Position("x".into())) };
        let listeners: Vec<Rc<Probe>> = vec![Rc::new(failing)];
        assert!(dispatch(&listeners, |l| l()).is_err());
    }

    #[test]
    fn test_remove_key_pressed_clears_bucket() {
        let mut listeners = Listeners::default();
        let listener: Rc<dyn KeyPressedListener> =
            Rc::new(|_: &Key, _: &mut Line, _: &mut Cursor, _: &mut Session| -> Result<Status> { Ok(Status::Ok) });
        listeners.add_key_pressed(Key::TAB, Rc::clone(&listener));
        listeners.add_key_pressed(Key::TAB, Rc::clone(&listener));
        listeners.add_key_pressed(Key::ENTER, listener);
        assert_eq!(listeners.key_pressed(&Key::TAB).len(), 2);

        listeners.remove_key_pressed(&Key::TAB);
        assert!(listeners.key_pressed(&Key::TAB).is_empty());
        assert_eq!(listeners.key_pressed(&Key::ENTER).len(), 1);
        assert!(listeners.key_pressed(&Key::Any).is_empty());
    }
}
