//! A single dismissible message: title, URL-aware body, optional icon,
//! secondary actor, action area and media controls.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::animation::{Easing, Property, Tween};
use crate::error::{ChildSlot, Error, Result};
use crate::event::{HandlerId, Key, Propagation, Signals};
use crate::layout::{ExpanderLayout, ScaleLayout};
use crate::shell::Services;
use crate::text::{UrlHighlighter, fix_markup};
use crate::widget::{Actor, ActorSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageSignal {
    /// The user asked to dismiss the message.
    Close,
    Expanded,
    Unexpanded,
}

/// Logical body state. Lags behind the visuals while collapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Collapsed,
    Expanded,
}

pub struct Message {
    weak_self: Weak<Message>,
    services: Rc<Services>,
    actor: Actor,
    action_bin: Actor,
    icon_bin: Actor,
    media_controls: Actor,
    title_label: Actor,
    secondary_bin: Actor,
    close_button: Actor,
    body_layout: Rc<ExpanderLayout>,
    body_label: Rc<UrlHighlighter>,
    expanded_label: RefCell<Option<Rc<UrlHighlighter>>>,
    title: RefCell<String>,
    title_markup: RefCell<String>,
    body_text: RefCell<String>,
    use_body_markup: Cell<bool>,
    expanded: Cell<bool>,
    signals: Signals<MessageSignal>,
}

impl Message {
    pub fn new(title: &str, body: &str, services: &Rc<Services>) -> Rc<Self> {
        let message = Rc::new_cyclic(|weak: &Weak<Self>| {
            let actor = Actor::new("message");
            let vbox = Actor::new("message-vbox");
            actor.set_child(Some(vbox.clone()));

            let hbox = Actor::new("message-hbox");
            vbox.add_child(hbox.clone());

            let action_bin = Actor::with_layout("message-action-bin", Rc::new(ScaleLayout));
            action_bin.hide();
            vbox.add_child(action_bin.clone());

            let icon_bin = Actor::new("message-icon-bin");
            icon_bin.hide();
            hbox.add_child(icon_bin.clone());

            let content_box = Actor::new("message-content");
            hbox.add_child(content_box.clone());

            let media_controls = Actor::new("message-media-controls");
            hbox.add_child(media_controls.clone());

            let title_box = Actor::new("message-title-box");
            content_box.add_child(title_box.clone());

            let title_label = Actor::new("message-title");
            title_box.add_child(title_label.clone());

            let secondary_bin = Actor::new("message-secondary-bin");
            title_box.add_child(secondary_bin.clone());

            let close_button = Actor::new("message-close-button");
            close_button.add_child(Actor::new("window-close-symbolic"));
            close_button.hide();
            title_box.add_child(close_button.clone());

            let body_stack = Actor::new("message-body-stack");
            content_box.add_child(body_stack.clone());
            let body_layout = ExpanderLayout::new(&body_stack, services.config.expand_lines);

            let body_label = UrlHighlighter::new("", false, services);
            if let Err(e) = body_layout.set_collapsed_child(Some(body_label.actor().clone())) {
                tracing::warn!("Body stack already populated: {}", e);
            }

            let w = weak.clone();
            close_button.connect(ActorSignal::Clicked, move || {
                if let Some(this) = w.upgrade() {
                    this.close();
                }
            });
            for (source, signal) in [
                (&actor, ActorSignal::HoverChanged),
                (&media_controls, ActorSignal::ChildAdded),
                (&media_controls, ActorSignal::ChildRemoved),
            ] {
                let w = weak.clone();
                source.connect(signal, move || {
                    if let Some(this) = w.upgrade() {
                        this.sync();
                    }
                });
            }

            Self {
                weak_self: weak.clone(),
                services: services.clone(),
                actor,
                action_bin,
                icon_bin,
                media_controls,
                title_label,
                secondary_bin,
                close_button,
                body_layout,
                body_label,
                expanded_label: RefCell::new(None),
                title: RefCell::new(String::new()),
                title_markup: RefCell::new(String::new()),
                body_text: RefCell::new(String::new()),
                use_body_markup: Cell::new(false),
                expanded: Cell::new(false),
                signals: Signals::new(),
            }
        });
        message.set_title(title);
        message.set_body(body);
        message.sync();
        message
    }

    /// Top-level actor; a section reparents it into its own container.
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn connect(&self, signal: MessageSignal, callback: impl Fn() + 'static) -> HandlerId {
        self.signals.connect(signal, callback)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.signals.disconnect(id)
    }

    fn emit(&self, signal: MessageSignal) {
        if !self.actor.is_destroyed() {
            self.signals.emit(signal);
        }
    }

    /// Ask whoever owns the message to dismiss it.
    pub fn close(&self) {
        self.emit(MessageSignal::Close);
    }

    /// Destroy the actor tree. No signal is emitted afterwards.
    pub fn destroy(&self) {
        self.actor.destroy();
        self.signals.clear();
    }

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    /// Escaped single-line title as handed to the renderer.
    pub fn title_markup(&self) -> String {
        self.title_markup.borrow().clone()
    }

    pub fn set_title(&self, text: &str) {
        let markup = fix_markup(&text.replace('\n', " "), false, self.services.markup.as_ref());
        *self.title.borrow_mut() = text.to_string();
        *self.title_markup.borrow_mut() = markup;
        self.title_label.queue_relayout();
    }

    pub fn body_text(&self) -> String {
        self.body_text.borrow().clone()
    }

    /// The collapsed label shows the body on one line; the expanded label,
    /// once built, gets it verbatim.
    pub fn set_body(&self, text: &str) {
        *self.body_text.borrow_mut() = text.to_string();
        let markup = self.use_body_markup.get();
        self.body_label.set_markup(&text.replace('\n', " "), markup);
        let expanded = self.expanded_label.borrow().clone();
        if let Some(label) = expanded {
            label.set_markup(text, markup);
        }
    }

    pub fn use_body_markup(&self) -> bool {
        self.use_body_markup.get()
    }

    pub fn set_use_body_markup(&self, enable: bool) {
        if self.use_body_markup.replace(enable) == enable {
            return;
        }
        let body = self.body_text();
        self.set_body(&body);
    }

    pub fn body_label(&self) -> &Rc<UrlHighlighter> {
        &self.body_label
    }

    /// The label built on first expansion, if any.
    pub fn expanded_label(&self) -> Option<Rc<UrlHighlighter>> {
        self.expanded_label.borrow().clone()
    }

    pub fn body_layout(&self) -> &Rc<ExpanderLayout> {
        &self.body_layout
    }

    pub fn title_label(&self) -> &Actor {
        &self.title_label
    }

    pub fn close_button(&self) -> &Actor {
        &self.close_button
    }

    pub fn secondary_bin(&self) -> &Actor {
        &self.secondary_bin
    }

    pub fn icon_bin(&self) -> &Actor {
        &self.icon_bin
    }

    pub fn action_bin(&self) -> &Actor {
        &self.action_bin
    }

    pub fn set_icon(&self, icon: Option<Actor>) {
        self.icon_bin.set_visible(icon.is_some());
        self.icon_bin.set_child(icon);
    }

    pub fn icon(&self) -> Option<Actor> {
        self.icon_bin.child_at_index(0)
    }

    pub fn set_secondary_actor(&self, actor: Option<Actor>) {
        self.secondary_bin.set_child(actor);
    }

    pub fn secondary_actor(&self) -> Option<Actor> {
        self.secondary_bin.child_at_index(0)
    }

    pub fn action_area(&self) -> Option<Actor> {
        self.action_bin.child_at_index(0)
    }

    /// Install the action area, or destroy the current one with `None`.
    pub fn set_action_area(&self, actor: Option<Actor>) -> Result<()> {
        let current = self.action_area();
        let Some(actor) = actor else {
            if let Some(old) = current {
                old.destroy();
            }
            return Ok(());
        };
        if current.is_some() {
            return Err(Error::DuplicateChild(ChildSlot::ActionArea));
        }
        self.action_bin.add_child(actor);
        self.action_bin.set_visible(self.expanded.get());
        Ok(())
    }

    /// Use `actor` as the expanded body instead of the default label, or
    /// destroy the current expanded body with `None`.
    pub fn set_expanded_body(&self, actor: Option<Actor>) -> Result<()> {
        if actor.is_none() {
            self.expanded_label.borrow_mut().take();
        }
        self.body_layout.set_expanded_child(actor)
    }

    pub fn set_expanded_lines(&self, lines: u32) {
        self.body_layout.set_expand_lines(lines);
    }

    /// Add a media control button; its `Clicked` runs `callback`. A message
    /// with media controls cannot be closed.
    pub fn add_media_control(&self, icon_name: &str, callback: impl Fn() + 'static) -> Actor {
        let button = Actor::new("message-media-control");
        button.add_child(Actor::new(icon_name));
        button.connect(ActorSignal::Clicked, callback);
        self.media_controls.add_child(button.clone());
        button
    }

    /// Destroy a button returned by [`add_media_control`](Self::add_media_control).
    pub fn remove_media_control(&self, button: &Actor) -> bool {
        if self.media_controls.index_of_child(button).is_none() {
            return false;
        }
        button.destroy();
        true
    }

    pub fn media_controls(&self) -> Vec<Actor> {
        self.media_controls.children()
    }

    pub fn can_close(&self) -> bool {
        self.media_controls.n_children() == 0
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn state(&self) -> BodyState {
        if self.expanded.get() { BodyState::Expanded } else { BodyState::Collapsed }
    }

    pub fn expand(&self, animate: bool) {
        self.expanded.set(true);
        self.action_bin.set_visible(self.action_bin.n_children() > 0);

        if self.body_layout.expanded_child().is_none() {
            let label = UrlHighlighter::new(&self.body_text(), self.use_body_markup.get(), &self.services);
            match self.body_layout.set_expanded_child(Some(label.actor().clone())) {
                Ok(()) => *self.expanded_label.borrow_mut() = Some(label),
                Err(e) => tracing::warn!("Could not add expanded body: {}", e),
            }
        }

        if animate {
            let time = self.services.config.animation_time;
            self.services.tweener.add_tween(
                Tween::new(self.body_layout.clone(), Property::Expansion, 1.0, time).easing(Easing::EaseOutQuad),
            );
            self.action_bin.set_scale_y(0.0);
            self.services.tweener.add_tween(
                Tween::new(self.action_bin.animatable(), Property::ScaleY, 1.0, time).easing(Easing::EaseOutQuad),
            );
        } else {
            self.body_layout.set_expansion(1.0);
            self.action_bin.set_scale_y(1.0);
        }

        self.emit(MessageSignal::Expanded);
    }

    /// Collapse the body. When animated, the message stays logically
    /// expanded until the action area has shrunk away.
    pub fn unexpand(&self, animate: bool) {
        if animate {
            let time = self.services.config.animation_time;
            self.services.tweener.add_tween(
                Tween::new(self.body_layout.clone(), Property::Expansion, 0.0, time).easing(Easing::EaseOutQuad),
            );
            let weak = self.weak_self.clone();
            self.services.tweener.add_tween(
                Tween::new(self.action_bin.animatable(), Property::ScaleY, 0.0, time)
                    .easing(Easing::EaseOutQuad)
                    .on_complete(move || {
                        if let Some(this) = weak.upgrade() {
                            this.action_bin.hide();
                            this.expanded.set(false);
                        }
                    }),
            );
        } else {
            self.body_layout.set_expansion(0.0);
            self.action_bin.set_scale_y(0.0);
            self.expanded.set(false);
        }

        self.emit(MessageSignal::Unexpanded);
    }

    /// Delete closes the message.
    pub fn key_press(&self, key: Key) -> Propagation {
        match key {
            Key::Delete | Key::KpDelete => {
                self.close();
                Propagation::Stop
            }
            _ => Propagation::Propagate,
        }
    }

    /// The close button shows on hover when closing is allowed; the
    /// secondary actor shows otherwise.
    fn sync(&self) {
        let hovered = self.actor.hover();
        self.close_button.set_visible(hovered && self.can_close());
        self.secondary_bin.set_visible(!hovered);
    }
}
