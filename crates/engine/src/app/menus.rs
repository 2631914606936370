use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use super::manager::Manager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuId {
    Background,
    Start,
    Play,
    Next,
}

/// How a menu interacts with the stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuType {
    /// Stacked; stays visible under menus opened on top of it.
    #[default]
    Static,
    /// Stacked; hidden while another stacked menu is on top.
    Sequencing,
    /// Shown without touching the stack.
    NoSequencing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Added(MenuId),
    Removed(MenuId),
    Activated(MenuId),
    Deactivated(MenuId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("menu {0:?} is not registered")]
    NotRegistered(MenuId),
    #[error("menu {0:?} is not on the stack")]
    NotStacked(MenuId),
    #[error("menu stack is empty")]
    StackEmpty,
}

#[derive(Debug, Clone, Copy)]
struct MenuState {
    menu_type: MenuType,
    is_shown: bool,
    is_enabled: bool,
}

#[derive(Debug, Default)]
pub struct MenuStack {
    menus: HashMap<MenuId, MenuState>,
    stack: Vec<MenuId>,
    events: Vec<MenuEvent>,
}

impl MenuStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_menu(&mut self, id: MenuId, menu_type: MenuType) {
        self.menus.insert(
            id,
            MenuState {
                menu_type,
                is_shown: false,
                is_enabled: true,
            },
        );
        self.events.push(MenuEvent::Added(id));
    }

    pub fn remove_menu(&mut self, id: MenuId) -> bool {
        if self.menus.remove(&id).is_none() {
            return false;
        }
        self.stack.retain(|entry| *entry != id);
        self.events.push(MenuEvent::Removed(id));
        true
    }

    pub fn has_menu(&self, id: MenuId) -> bool {
        self.menus.contains_key(&id)
    }

    pub fn menu_type(&self, id: MenuId) -> Option<MenuType> {
        self.menus.get(&id).map(|state| state.menu_type)
    }

    pub fn is_shown(&self, id: MenuId) -> bool {
        self.menus.get(&id).is_some_and(|state| state.is_shown)
    }

    pub fn is_enabled(&self, id: MenuId) -> bool {
        self.menus.get(&id).is_some_and(|state| state.is_enabled)
    }

    pub fn active_menu(&self) -> Option<MenuId> {
        self.stack.last().copied()
    }

    pub fn stack(&self) -> &[MenuId] {
        &self.stack
    }

    pub fn activate(&mut self, id: MenuId) -> Result<(), MenuError> {
        let menu_type = self.menu_type(id).ok_or(MenuError::NotRegistered(id))?;
        let sequenced = menu_type != MenuType::NoSequencing;
        if sequenced && self.active_menu() == Some(id) {
            return Ok(());
        }

        let previous = self.active_menu();
        if sequenced {
            self.stack.push(id);
        }
        if let Some(previous) = previous {
            if sequenced && self.menu_type(previous) == Some(MenuType::Sequencing) {
                self.set_shown(previous, false);
                self.events.push(MenuEvent::Deactivated(previous));
            }
        }

        self.set_shown(id, true);
        self.events.push(MenuEvent::Activated(id));
        debug!(menu = ?id, stack_depth = self.stack.len(), "menu_activated");
        Ok(())
    }

    /// Removes `id` from the stack, re-showing whatever ends up on top.
    /// Returns false when the menu was not on the stack.
    pub fn deactivate(&mut self, id: MenuId) -> bool {
        let Some(position) = self.stack.iter().position(|entry| *entry == id) else {
            return false;
        };
        self.stack.remove(position);

        if let Some(top) = self.active_menu() {
            if !self.is_shown(top) {
                self.set_shown(top, true);
                self.events.push(MenuEvent::Activated(top));
            }
        }

        self.set_shown(id, false);
        self.events.push(MenuEvent::Deactivated(id));
        debug!(menu = ?id, stack_depth = self.stack.len(), "menu_deactivated");
        true
    }

    pub fn deactivate_last(&mut self) -> Result<MenuId, MenuError> {
        let Some(top) = self.active_menu() else {
            warn!("menu_stack_empty");
            return Err(MenuError::StackEmpty);
        };
        self.deactivate(top);
        Ok(top)
    }

    pub fn set_menus_enabled(&mut self, enabled: bool) {
        for state in self.menus.values_mut() {
            state.is_enabled = enabled;
        }
    }

    pub fn drain_events(&mut self) -> Vec<MenuEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_shown(&mut self, id: MenuId, shown: bool) {
        if let Some(state) = self.menus.get_mut(&id) {
            state.is_shown = shown;
        }
    }
}

impl Manager for MenuStack {
    fn name(&self) -> &'static str {
        "menus"
    }

    fn dispose(&mut self) {
        self.stack.clear();
        for state in self.menus.values_mut() {
            state.is_shown = false;
        }
        self.events.clear();
    }
}
