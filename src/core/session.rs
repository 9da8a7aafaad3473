//! Session management
//!
//! A [`Session`] owns the terminal I/O, the history, the completion index and
//! the listener registrations. Each [`Session::read_line`] call builds a
//! fresh [`Line`] and [`Cursor`] and lends them to listeners while it runs
//! the read-decode-dispatch loop.

use std::rc::Rc;

use tracing::{debug, info, trace};

use super::cursor::Cursor;
use super::io::{Io, Result, Size};
use super::key::Key;
use super::line::Line;
use super::listener::{
    dispatch, KeyPressedListener, LineChangedListener, LineEnteredListener, Listeners, Status,
};
use crate::completion::Completion;
use crate::history::History;
use crate::style::{CursorStyle, TextStyle, RESET};

/// An interactive line-reading session
pub struct Session {
    io: Box<dyn Io>,
    history: History,
    completion: Completion,
    listeners: Listeners,
    prompt_style: TextStyle,
    line_style: TextStyle,
    cursor_style: CursorStyle,
}

impl Session {
    /// Create a session with an in-memory history and no completion words
    pub fn new(io: impl Io + 'static) -> Self {
        Self::with_parts(io, History::default(), Completion::new())
    }

    /// Create a session from its collaborators and wire the default bindings
    pub fn with_parts(io: impl Io + 'static, history: History, completion: Completion) -> Self {
        let mut session = Self {
            io: Box::new(io),
            history,
            completion,
            listeners: Listeners::default(),
            prompt_style: TextStyle::default(),
            line_style: TextStyle::default(),
            cursor_style: CursorStyle::default(),
        };
        session.register_default_key_listeners();
        session.register_default_line_entered_listeners();
        session
    }

    /// Terminal I/O of this session
    pub fn io(&mut self) -> &mut dyn Io {
        self.io.as_mut()
    }

    /// Committed lines, newest first
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mutable history, e.g. to load or clear it
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Completion word index
    pub fn completion(&self) -> &Completion {
        &self.completion
    }

    /// Mutable completion index for adding words
    pub fn completion_mut(&mut self) -> &mut Completion {
        &mut self.completion
    }

    /// Bind a closure to `key`, [`Key::Any`] for every key
    pub fn on_key_pressed<F>(&mut self, key: Key, handler: F)
    where
        F: Fn(&Key, &mut Line, &mut Cursor, &mut Session) -> Result<Status> + 'static,
    {
        self.add_key_pressed_listener(key, Rc::new(handler));
    }

    /// Bind a shared listener to `key`
    pub fn add_key_pressed_listener(&mut self, key: Key, listener: Rc<dyn KeyPressedListener>) {
        self.listeners.add_key_pressed(key, listener);
    }

    /// Drop every listener bound to exactly `key`
    pub fn remove_key_pressed_listeners(&mut self, key: &Key) {
        self.listeners.remove_key_pressed(key);
    }

    /// Register a closure called whenever the content changes
    pub fn on_line_changed<F>(&mut self, handler: F)
    where
        F: Fn(&str, &mut Line, &mut Cursor, &mut Session) -> Result<Status> + 'static,
    {
        self.add_line_changed_listener(Rc::new(handler));
    }

    /// Register a shared line-changed listener
    pub fn add_line_changed_listener(&mut self, listener: Rc<dyn LineChangedListener>) {
        self.listeners.add_line_changed(listener);
    }

    /// Drop every line-changed listener
    pub fn remove_line_changed_listeners(&mut self) {
        self.listeners.remove_line_changed();
    }

    /// Register a closure called with each committed, trimmed line
    pub fn on_line_entered<F>(&mut self, handler: F)
    where
        F: Fn(&str, &mut Session) -> Result<Status> + 'static,
    {
        self.add_line_entered_listener(Rc::new(handler));
    }

    /// Register a shared line-entered listener
    pub fn add_line_entered_listener(&mut self, listener: Rc<dyn LineEnteredListener>) {
        self.listeners.add_line_entered(listener);
    }

    /// Drop every line-entered listener, default commands included
    pub fn remove_line_entered_listeners(&mut self) {
        self.listeners.remove_line_entered();
    }

    /// Style of the prompt, applied from the next read
    pub fn set_prompt_style(&mut self, style: TextStyle) {
        self.prompt_style = style;
    }

    /// Get the prompt style
    pub fn prompt_style(&self) -> &TextStyle {
        &self.prompt_style
    }

    /// Style of the typed content, applied from the next read
    pub fn set_line_style(&mut self, style: TextStyle) {
        self.line_style = style;
    }

    /// Get the content style
    pub fn line_style(&self) -> &TextStyle {
        &self.line_style
    }

    /// Set the cursor color, applied to the terminal immediately
    pub fn set_cursor_style(&mut self, style: CursorStyle) -> Result<()> {
        self.cursor_style = style;
        self.io.write(&style.escape())
    }

    /// Get the cursor style
    pub fn cursor_style(&self) -> &CursorStyle {
        &self.cursor_style
    }

    /// Back to default prompt, content and cursor styles
    pub fn reset_style(&mut self) -> Result<()> {
        self.prompt_style = TextStyle::default();
        self.line_style = TextStyle::default();
        self.set_cursor_style(CursorStyle::default())
    }

    /// Write text as is
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.io.write(text)
    }

    /// Write text wrapped in `style` and a reset
    pub fn write_styled(&mut self, text: &str, style: &TextStyle) -> Result<()> {
        if style.is_default() {
            return self.io.write(text);
        }
        self.io.write(&format!("{}{}{}", style.as_str(), text, RESET))
    }

    /// Ring the terminal bell
    pub fn bell(&mut self) -> Result<()> {
        self.io.write("\x07")
    }

    /// Clear from the cursor to the end of the screen line
    pub fn clear_current_line(&mut self) -> Result<()> {
        self.io.write("\x1b[K")
    }

    /// Terminal size in cells
    pub fn size(&self) -> Size {
        self.io.window_size()
    }

    /// Read lines and dispatch them until a line-entered listener breaks
    pub fn run(&mut self, prompt: &str) -> Result<()> {
        info!("Session started with prompt {:?}", prompt);
        loop {
            let content = self.read_line(prompt)?;
            if self.dispatch_line_entered(content.trim())? == Status::Break {
                break;
            }
        }
        info!("Session finished");
        Ok(())
    }

    /// Edit one line until a listener breaks the read, then commit it
    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        let mut line = Line::new(prompt, self.prompt_style.clone(), self.line_style.clone());
        line.update(self.io.as_mut())?;
        let mut cursor = Cursor::new(&line, self.io.as_mut())?;
        let mut content = String::new();

        loop {
            let key = self.io.get_key()?;
            trace!("Key {}", key.describe());
            if key != *self.completion.trigger() {
                self.completion.reset();
            }

            match self.dispatch_key_pressed(&key, &mut line, &mut cursor)? {
                Status::Continue => continue,
                Status::Break => break,
                Status::Ok => {}
            }

            if let Some(c) = key.as_char() {
                cursor.put_char(&mut line, c, self.io.as_mut())?;
                if self.history.is_manipulated() {
                    self.history.rewind();
                }
            }

            if content == line.content() {
                continue;
            }
            content = line.content().to_string();
            if self.dispatch_line_changed(&content, &mut line, &mut cursor)? == Status::Break {
                break;
            }
        }

        let content = line.content().to_string();
        self.history.insert(&content);
        self.history.rewind();
        debug!("Line committed: {:?}", content);
        Ok(content)
    }

    /// Run the completion listener against the live line
    pub fn complete(&mut self, key: &Key, line: &mut Line, cursor: &mut Cursor) -> Result<Status> {
        let Self { completion, io, .. } = self;
        completion.on_key(key, line, cursor, io.as_mut())
    }

    /// Exact-key listeners first, then the wildcard bucket
    fn dispatch_key_pressed(&mut self, key: &Key, line: &mut Line, cursor: &mut Cursor) -> Result<Status> {
        let exact = self.listeners.key_pressed(key);
        let status = dispatch(&exact, |l| l.invoke(key, line, cursor, self))?;
        if status != Status::Ok {
            trace!("Key {} stopped at exact listeners: {:?}", key, status);
            return Ok(status);
        }

        let wildcard = self.listeners.key_pressed(&Key::Any);
        dispatch(&wildcard, |l| l.invoke(key, line, cursor, self))
    }

    fn dispatch_line_changed(&mut self, content: &str, line: &mut Line, cursor: &mut Cursor) -> Result<Status> {
        let listeners = self.listeners.line_changed();
        dispatch(&listeners, |l| l.invoke(content, line, cursor, self))
    }

    fn dispatch_line_entered(&mut self, content: &str) -> Result<Status> {
        let listeners = self.listeners.line_entered();
        let status = dispatch(&listeners, |l| l.invoke(content, self))?;
        debug!("Line {:?} entered: {:?}", content, status);
        Ok(status)
    }

    fn register_default_key_listeners(&mut self) {
        self.on_key_pressed(Key::ENTER, |_, _, _, session| {
            session.write_text("\n")?;
            Ok(Status::Break)
        });

        self.on_key_pressed(Key::HOME, |_, line, cursor, session| {
            cursor.move_to_home(line, session.io())?;
            Ok(Status::Continue)
        });

        self.on_key_pressed(Key::END, |_, line, cursor, session| {
            cursor.move_to_end(line, session.io())?;
            Ok(Status::Continue)
        });

        self.on_key_pressed(Key::ARROW_LEFT, |_, line, cursor, session| {
            cursor.move_left(line, session.io())?;
            Ok(Status::Continue)
        });

        self.on_key_pressed(Key::ARROW_RIGHT, |_, line, cursor, session| {
            cursor.move_right(line, session.io())?;
            Ok(Status::Continue)
        });

        self.on_key_pressed(Key::ARROW_UP, |_, line, cursor, session| {
            let history = session.history_mut();
            if !history.is_manipulated() {
                history.set_top_line(line.content());
            }
            let recalled = history.next().to_string();
            line.set_content(&recalled);
            line.update(session.io())?;
            cursor.move_to_end(line, session.io())?;
            Ok(Status::Continue)
        });

        self.on_key_pressed(Key::ARROW_DOWN, |_, line, cursor, session| {
            if session.history().is_manipulated() {
                let recalled = session.history_mut().prev().to_string();
                line.set_content(&recalled);
                line.update(session.io())?;
                cursor.move_to_end(line, session.io())?;
            }
            Ok(Status::Continue)
        });

        self.on_key_pressed(Key::BACKSPACE, |_, line, cursor, session| {
            cursor.eat_char(line, session.io())?;
            Ok(Status::Ok)
        });

        let exit: Rc<dyn KeyPressedListener> = Rc::new(
            |_: &Key, line: &mut Line, _: &mut Cursor, session: &mut Session| -> Result<Status> {
                line.set_content("exit");
                session.write_text("\n")?;
                Ok(Status::Break)
            },
        );
        self.add_key_pressed_listener(Key::ctrl('c'), Rc::clone(&exit));
        self.add_key_pressed_listener(Key::ctrl('d'), exit);

        let trigger = self.completion.trigger().clone();
        self.on_key_pressed(trigger, |key, line, cursor, session| session.complete(key, line, cursor));
    }

    fn register_default_line_entered_listeners(&mut self) {
        self.on_line_entered(|content, session| match content {
            "exit" | "quit" => {
                session.write_text("bye!\n")?;
                Ok(Status::Break)
            }
            "history" => {
                // Entry 0 is this very command
                let listing: String = session
                    .history()
                    .lines()
                    .iter()
                    .enumerate()
                    .skip(1)
                    .map(|(i, line)| format!("[{}] {}\n", i, line))
                    .collect();
                session.write_text(&listing)?;
                Ok(Status::Continue)
            }
            _ => Ok(Status::Ok),
        });

        self.completion.extend(["exit", "history"]);
    }
}
