mod audio;
mod manager;
mod menus;

pub use audio::{
    AudioCategorizer, AudioCategory, AudioManager, SoundCue, VolumeChange, VolumeListener,
    VolumeListenerHandle, DEFAULT_VOLUME,
};
pub use manager::{
    Core, InitializationResult, InitializationResultType, Manager, ManagerError, ManagerSet,
};
pub use menus::{MenuError, MenuEvent, MenuId, MenuStack, MenuType};
