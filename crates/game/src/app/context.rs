use engine::{
    AudioManager, KeyValueStore, LevelManager, Manager, ManagerSet, MenuId, MenuStack, MenuType,
};

/// Every subsystem the game talks to, owned in one place and handed to
/// whoever needs it.
#[derive(Debug)]
pub(crate) struct GameContext<S: KeyValueStore> {
    pub(crate) audio: AudioManager<S>,
    pub(crate) levels: LevelManager<S>,
    pub(crate) menus: MenuStack,
}

impl<S: KeyValueStore> GameContext<S> {
    pub(crate) fn new(audio: AudioManager<S>, levels: LevelManager<S>) -> Self {
        let mut menus = MenuStack::new();
        menus.add_menu(MenuId::Background, MenuType::Static);
        menus.add_menu(MenuId::Start, MenuType::Sequencing);
        menus.add_menu(MenuId::Play, MenuType::Sequencing);
        menus.add_menu(MenuId::Next, MenuType::Sequencing);
        menus.drain_events();
        Self {
            audio,
            levels,
            menus,
        }
    }
}

impl<S: KeyValueStore> ManagerSet for GameContext<S> {
    fn managers_mut(&mut self) -> Vec<&mut dyn Manager> {
        vec![
            &mut self.audio as &mut dyn Manager,
            &mut self.levels as &mut dyn Manager,
            &mut self.menus as &mut dyn Manager,
        ]
    }
}
