//! Titled, ordered collection of messages with animated insertion, moves,
//! removal and clearing.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Local};
use serde::Serialize;

use super::message::Message;
use crate::animation::{Easing, Property, Tween};
use crate::error::{Error, Result};
use crate::event::{HandlerId, Signals};
use crate::layout::ScaleLayout;
use crate::shell::Services;
use crate::text::UrlSpan;
use crate::widget::{Actor, ActorSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionSignal {
    /// `is_empty()` flipped.
    EmptyChanged,
    /// The title or a member message received keyboard focus.
    KeyFocusIn,
}

/// Progress of an animated move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MovePhase {
    ShrinkingOut,
    Repositioning,
    GrowingIn,
}

/// What the section holds for each member.
struct Membership {
    message: Rc<Message>,
    container: Actor,
    destroy_id: HandlerId,
    key_focus_id: HandlerId,
    close_id: HandlerId,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageSnapshot {
    pub title: String,
    pub body: String,
    pub expanded: bool,
    pub can_close: bool,
    pub urls: Vec<UrlSpan>,
    pub scale: f32,
    pub opacity: f32,
    pub translation_x: f32,
    pub move_phase: Option<MovePhase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSnapshot {
    pub title: String,
    pub date: String,
    pub empty: bool,
    pub visible: bool,
    pub can_clear: bool,
    /// Containers still in the list, including ones animating out.
    pub displayed: usize,
    pub messages: Vec<MessageSnapshot>,
}

pub struct MessageListSection {
    weak_self: Weak<MessageListSection>,
    services: Rc<Services>,
    title: String,
    actor: Actor,
    title_button: Actor,
    close_button: Actor,
    list: Actor,
    members: RefCell<Vec<Membership>>,
    moves: RefCell<HashMap<u64, MovePhase>>,
    date: Cell<DateTime<Local>>,
    empty: Cell<bool>,
    allowed: Cell<bool>,
    focused: RefCell<Option<Actor>>,
    signals: Signals<SectionSignal>,
}

impl MessageListSection {
    pub fn new(title: &str, services: &Rc<Services>) -> Rc<Self> {
        let section = Rc::new_cyclic(|weak: &Weak<Self>| {
            let actor = Actor::new("message-list-section");
            let title_box = Actor::new("message-list-section-title-box");
            actor.add_child(title_box.clone());

            let title_button = Actor::new("message-list-section-title");
            title_box.add_child(title_button.clone());

            let close_button = Actor::new("message-list-section-close");
            close_button.add_child(Actor::new("window-close-symbolic"));
            title_box.add_child(close_button.clone());

            let list = Actor::new("message-list-section-list");
            actor.add_child(list.clone());

            let w = weak.clone();
            title_button.connect(ActorSignal::Clicked, move || {
                if let Some(this) = w.upgrade() {
                    this.on_title_clicked();
                }
            });
            let w = weak.clone();
            let focus = title_button.downgrade();
            title_button.connect(ActorSignal::KeyFocusIn, move || {
                if let (Some(this), Some(actor)) = (w.upgrade(), focus.upgrade()) {
                    this.on_key_focus_in(actor);
                }
            });
            let w = weak.clone();
            close_button.connect(ActorSignal::Clicked, move || {
                if let Some(this) = w.upgrade() {
                    this.clear();
                }
            });
            for signal in [ActorSignal::ChildAdded, ActorSignal::ChildRemoved] {
                let w = weak.clone();
                list.connect(signal, move || {
                    if let Some(this) = w.upgrade() {
                        this.sync();
                    }
                });
            }

            Self {
                weak_self: weak.clone(),
                services: services.clone(),
                title: title.to_string(),
                actor,
                title_button,
                close_button,
                list,
                members: RefCell::new(Vec::new()),
                moves: RefCell::new(HashMap::new()),
                date: Cell::new(Local::now()),
                empty: Cell::new(true),
                allowed: Cell::new(true),
                focused: RefCell::new(None),
                signals: Signals::new(),
            }
        });
        section.sync();
        section
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn title_button(&self) -> &Actor {
        &self.title_button
    }

    pub fn close_button(&self) -> &Actor {
        &self.close_button
    }

    /// Parent of the per-message containers, in display order.
    pub fn list(&self) -> &Actor {
        &self.list
    }

    pub fn connect(&self, signal: SectionSignal, callback: impl Fn() + 'static) -> HandlerId {
        self.signals.connect(signal, callback)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.signals.disconnect(id)
    }

    /// No containers are displayed. Stays false while the last removed
    /// message is still animating out.
    pub fn is_empty(&self) -> bool {
        self.empty.get()
    }

    pub fn allowed(&self) -> bool {
        self.allowed.get()
    }

    /// Whether the current session shows this section at all.
    pub fn set_allowed(&self, allowed: bool) {
        if self.allowed.replace(allowed) != allowed {
            self.sync();
        }
    }

    pub fn date(&self) -> DateTime<Local> {
        self.date.get()
    }

    pub fn set_date(&self, date: DateTime<Local>) {
        if date.date_naive() == self.date.get().date_naive() {
            return;
        }
        self.date.set(date);
        self.sync();
    }

    /// Actor that last received keyboard focus inside the section.
    pub fn focused_actor(&self) -> Option<Actor> {
        self.focused.borrow().clone()
    }

    /// Members in insertion order.
    pub fn messages(&self) -> Vec<Rc<Message>> {
        self.members.borrow().iter().map(|m| m.message.clone()).collect()
    }

    /// Members in display order.
    pub fn displayed_messages(&self) -> Vec<Rc<Message>> {
        let members = self.members.borrow();
        self.list
            .children()
            .iter()
            .filter_map(|c| members.iter().find(|m| m.container == *c))
            .map(|m| m.message.clone())
            .collect()
    }

    pub fn n_messages(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_member(&self, message: &Rc<Message>) -> bool {
        self.container_of(message).is_some()
    }

    /// Scaling wrapper the section put around `message`.
    pub fn container_of(&self, message: &Rc<Message>) -> Option<Actor> {
        self.members
            .borrow()
            .iter()
            .find(|m| Rc::ptr_eq(&m.message, message))
            .map(|m| m.container.clone())
    }

    pub fn move_phase(&self, message: &Rc<Message>) -> Option<MovePhase> {
        let container = self.container_of(message)?;
        self.moves.borrow().get(&container.id()).copied()
    }

    pub fn add_message(&self, message: &Rc<Message>, animate: bool) -> Result<()> {
        self.add_message_at_index(message, -1, animate)
    }

    /// Insert `message` at display position `index`; negative appends.
    pub fn add_message_at_index(&self, message: &Rc<Message>, index: isize, animate: bool) -> Result<()> {
        if self.is_member(message) {
            return Err(Error::DuplicateMember { section: self.title.clone() });
        }

        let scale = if animate { 0.0 } else { 1.0 };
        let container = Actor::with_layout("message-container", Rc::new(ScaleLayout));
        container.set_scale(scale, scale);

        let msg = Rc::downgrade(message);
        let w = self.weak_self.clone();
        let focus = message.actor().downgrade();
        let key_focus_id = message.actor().connect(ActorSignal::KeyFocusIn, move || {
            if let (Some(this), Some(actor)) = (w.upgrade(), focus.upgrade()) {
                this.on_key_focus_in(actor);
            }
        });
        let w = self.weak_self.clone();
        let m = msg.clone();
        let destroy_id = message.actor().connect(ActorSignal::Destroy, move || {
            if let (Some(this), Some(message)) = (w.upgrade(), m.upgrade()) {
                if let Err(e) = this.remove_message(&message, false) {
                    tracing::warn!("Destroyed message: {}", e);
                }
            }
        });
        let w = self.weak_self.clone();
        let close_id = message.connect(super::MessageSignal::Close, move || {
            if let (Some(this), Some(message)) = (w.upgrade(), msg.upgrade()) {
                if let Err(e) = this.remove_message(&message, true) {
                    tracing::warn!("Closed message: {}", e);
                }
            }
        });

        self.members.borrow_mut().push(Membership {
            message: message.clone(),
            container: container.clone(),
            destroy_id,
            key_focus_id,
            close_id,
        });
        container.add_child(message.actor().clone());
        self.list.insert_child_at_index(container.clone(), index);
        tracing::debug!(section = %self.title, index, animate, "Added message");

        if animate {
            self.services.tweener.add_tween(
                Tween::new(container.animatable(), Property::Scale, 1.0, self.message_time())
                    .easing(Easing::EaseOutQuad),
            );
        }
        Ok(())
    }

    /// Move `message` to display position `index`. Animated moves shrink
    /// the container away, reposition it, then grow it back.
    pub fn move_message(&self, message: &Rc<Message>, index: isize, animate: bool) -> Result<()> {
        let container = self
            .container_of(message)
            .ok_or_else(|| Error::NotAMember { section: self.title.clone() })?;

        if animate {
            self.drive_move(&container, index, MovePhase::ShrinkingOut);
        } else {
            self.list.set_child_at_index(&container, index);
        }
        Ok(())
    }

    fn drive_move(&self, container: &Actor, index: isize, phase: MovePhase) {
        self.moves.borrow_mut().insert(container.id(), phase);
        let time = self.message_time();
        match phase {
            MovePhase::ShrinkingOut => {
                let w = self.weak_self.clone();
                let c = container.clone();
                self.services.tweener.add_tween(
                    Tween::new(container.animatable(), Property::Scale, 0.0, time)
                        .easing(Easing::EaseOutQuad)
                        .on_complete(move || {
                            let Some(this) = w.upgrade() else { return };
                            // Removed while shrinking.
                            if this.moves.borrow().contains_key(&c.id()) {
                                this.drive_move(&c, index, MovePhase::Repositioning);
                            }
                        }),
                );
            }
            MovePhase::Repositioning => {
                self.list.set_child_at_index(container, index);
                self.drive_move(container, index, MovePhase::GrowingIn);
            }
            MovePhase::GrowingIn => {
                let w = self.weak_self.clone();
                let id = container.id();
                self.services.tweener.add_tween(
                    Tween::new(container.animatable(), Property::Scale, 1.0, time)
                        .easing(Easing::EaseOutQuad)
                        .on_complete(move || {
                            if let Some(this) = w.upgrade() {
                                this.moves.borrow_mut().remove(&id);
                            }
                        }),
                );
            }
        }
    }

    /// Drop `message` from the section. Its handlers are disconnected and it
    /// stops being a member right away; the container (and the message
    /// actor in it) is destroyed now, or after shrinking when `animate`.
    pub fn remove_message(&self, message: &Rc<Message>, animate: bool) -> Result<()> {
        let record = {
            let mut members = self.members.borrow_mut();
            let pos = members
                .iter()
                .position(|m| Rc::ptr_eq(&m.message, message))
                .ok_or_else(|| Error::NotAMember { section: self.title.clone() })?;
            members.remove(pos)
        };

        message.actor().disconnect(record.destroy_id);
        message.actor().disconnect(record.key_focus_id);
        message.disconnect(record.close_id);
        self.moves.borrow_mut().remove(&record.container.id());
        tracing::debug!(section = %self.title, animate, "Removed message");

        let container = record.container;
        if animate {
            let host = self.services.host.clone();
            let c = container.clone();
            self.services.tweener.add_tween(
                Tween::new(container.animatable(), Property::Scale, 0.0, self.message_time())
                    .easing(Easing::EaseOutQuad)
                    .on_complete(move || {
                        c.destroy();
                        host.sync_pointer();
                    }),
            );
        } else {
            container.destroy();
            self.services.host.sync_pointer();
        }
        Ok(())
    }

    /// Close every closable member. Two or more slide out one after another
    /// before closing.
    pub fn clear(&self) {
        let closable: Vec<(Rc<Message>, Actor)> = self
            .members
            .borrow()
            .iter()
            .filter(|m| m.message.can_close())
            .map(|m| (m.message.clone(), m.container.clone()))
            .collect();

        if closable.len() < 2 {
            for (message, _) in closable {
                message.close();
            }
            return;
        }

        let time = self.message_time();
        let stagger = time / closable.len().max(5) as f64;
        let width = self.list_width() as f64;
        for (i, (message, container)) in closable.into_iter().enumerate() {
            let delay = stagger * i as f64;
            self.services.tweener.add_tween(
                Tween::new(container.animatable(), Property::Opacity, 0.0, time)
                    .delay(delay)
                    .easing(Easing::EaseOutQuad),
            );
            let m = Rc::downgrade(&message);
            self.services.tweener.add_tween(
                Tween::new(container.animatable(), Property::TranslationX, width, time)
                    .delay(delay)
                    .easing(Easing::EaseOutQuad)
                    .on_complete(move || {
                        if let Some(message) = m.upgrade() {
                            message.close();
                        }
                    }),
            );
        }
    }

    pub fn can_clear(&self) -> bool {
        self.members.borrow().iter().any(|m| m.message.can_close())
    }

    /// Recompute emptiness and visibility. Hosts call this when the session
    /// mode changes.
    pub fn sync(&self) {
        let empty = self.list.n_children() == 0;
        let changed = self.empty.replace(empty) != empty;
        if changed {
            self.signals.emit(SectionSignal::EmptyChanged);
        }

        self.close_button.set_visible(self.can_clear());
        self.actor.set_visible(self.allowed.get() && !empty);
    }

    pub fn snapshot(&self) -> SectionSnapshot {
        let moves = self.moves.borrow().clone();
        let messages = self
            .displayed_messages()
            .iter()
            .map(|message| {
                let container = self.container_of(message);
                MessageSnapshot {
                    title: message.title(),
                    body: message.body_text(),
                    expanded: message.is_expanded(),
                    can_close: message.can_close(),
                    urls: message.body_label().urls(),
                    scale: container.as_ref().map_or(1.0, Actor::scale_x),
                    opacity: container.as_ref().map_or(1.0, Actor::opacity),
                    translation_x: container.as_ref().map_or(0.0, Actor::translation_x),
                    move_phase: container.and_then(|c| moves.get(&c.id()).copied()),
                }
            })
            .collect();

        SectionSnapshot {
            title: self.title.clone(),
            date: self.date.get().format("%Y-%m-%d").to_string(),
            empty: self.is_empty(),
            visible: self.actor.is_visible(),
            can_clear: self.can_clear(),
            displayed: self.list.n_children(),
            messages,
        }
    }

    fn message_time(&self) -> f64 {
        self.services.config.message_animation_time
    }

    fn list_width(&self) -> f32 {
        self.list
            .allocation()
            .map(|rect| rect.width)
            .unwrap_or_else(|| self.list.preferred_width(None).natural)
    }

    fn on_title_clicked(&self) {
        self.services.host.hide_overview();
        self.services.host.close_calendar();
    }

    fn on_key_focus_in(&self, actor: Actor) {
        *self.focused.borrow_mut() = Some(actor);
        self.signals.emit(SectionSignal::KeyFocusIn);
    }
}
