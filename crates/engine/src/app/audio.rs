use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::storage::KeyValueStore;

use super::manager::{Manager, ManagerError};

pub const DEFAULT_VOLUME: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCategory {
    Global,
    Fx,
    Music,
}

impl AudioCategory {
    pub const ALL: [AudioCategory; 3] = [
        AudioCategory::Global,
        AudioCategory::Fx,
        AudioCategory::Music,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AudioCategory::Global => "Global",
            AudioCategory::Fx => "Fx",
            AudioCategory::Music => "Music",
        }
    }

    /// Key the category's volume is persisted under.
    pub fn store_key(self) -> String {
        format!("Volume.{}", self.name())
    }

    fn index(self) -> usize {
        match self {
            AudioCategory::Global => 0,
            AudioCategory::Fx => 1,
            AudioCategory::Music => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeChange {
    pub category: AudioCategory,
    pub previous: f32,
    pub current: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    CardFlip,
    MatchCorrect,
    MatchIncorrect,
    LevelWin,
}

impl SoundCue {
    pub fn category(self) -> AudioCategory {
        AudioCategory::Fx
    }
}

pub trait VolumeListener {
    fn on_volume_changed(&mut self, change: VolumeChange);
}

impl<T: VolumeListener> VolumeListener for Rc<RefCell<T>> {
    fn on_volume_changed(&mut self, change: VolumeChange) {
        self.borrow_mut().on_volume_changed(change);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VolumeListenerHandle(u64);

/// Per-category volumes backed by a [`KeyValueStore`], plus the queue of
/// sound cues the host is expected to play.
pub struct AudioManager<S: KeyValueStore> {
    volumes: [f32; 3],
    store: S,
    listeners: Vec<(VolumeListenerHandle, Box<dyn VolumeListener>)>,
    next_handle: u64,
    changes: Vec<VolumeChange>,
    cues: Vec<SoundCue>,
}

impl<S: KeyValueStore> AudioManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            volumes: [DEFAULT_VOLUME; 3],
            store,
            listeners: Vec::new(),
            next_handle: 0,
            changes: Vec::new(),
            cues: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn volume(&self, category: AudioCategory) -> f32 {
        self.volumes[category.index()]
    }

    pub fn global_volume(&self) -> f32 {
        self.volume(AudioCategory::Global)
    }

    pub fn fx_volume(&self) -> f32 {
        self.volume(AudioCategory::Fx)
    }

    pub fn music_volume(&self) -> f32 {
        self.volume(AudioCategory::Music)
    }

    pub fn is_sound_enabled(&self) -> bool {
        self.global_volume() > 0.0
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.set_volume(AudioCategory::Global, if enabled { 1.0 } else { 0.0 });
    }

    /// Clamps `volume` to `[0, 1]`, persists it and notifies listeners when
    /// the value actually changed.
    pub fn set_volume(&mut self, category: AudioCategory, volume: f32) {
        let current = clamp01(volume);
        let previous = self.volumes[category.index()];
        self.volumes[category.index()] = current;

        self.store.set_float(&category.store_key(), current);
        if let Err(error) = self.store.save() {
            warn!(category = category.name(), error = %error, "volume_save_failed");
        }

        if previous == current {
            return;
        }
        let change = VolumeChange {
            category,
            previous,
            current,
        };
        for (_, listener) in &mut self.listeners {
            listener.on_volume_changed(change);
        }
        self.changes.push(change);
        debug!(category = category.name(), previous, current, "volume_changed");
    }

    pub fn add_volume_listener(
        &mut self,
        listener: Box<dyn VolumeListener>,
    ) -> VolumeListenerHandle {
        let handle = VolumeListenerHandle(self.next_handle);
        self.next_handle += 1;
        self.listeners.push((handle, listener));
        handle
    }

    pub fn remove_volume_listener(&mut self, handle: VolumeListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != handle);
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn drain_volume_changes(&mut self) -> Vec<VolumeChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn play(&mut self, cue: SoundCue) {
        debug!(cue = ?cue, "sound_cue_queued");
        self.cues.push(cue);
    }

    pub fn play_all(&mut self, cues: impl IntoIterator<Item = SoundCue>) {
        for cue in cues {
            self.play(cue);
        }
    }

    pub fn drain_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }

    fn load_volumes(&mut self) {
        for category in AudioCategory::ALL {
            let volume = match self.store.get_float(&category.store_key()) {
                Some(stored) if (0.0..=1.0).contains(&stored) => stored,
                Some(stored) => {
                    warn!(category = category.name(), stored, "stored_volume_out_of_range");
                    clamp01(stored)
                }
                None => DEFAULT_VOLUME,
            };
            self.volumes[category.index()] = volume;
        }
    }
}

impl<S: KeyValueStore> Manager for AudioManager<S> {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn load_priority(&self) -> i32 {
        0
    }

    fn launch(&mut self) -> Result<(), ManagerError> {
        self.load_volumes();
        info!(
            global = self.global_volume(),
            fx = self.fx_volume(),
            music = self.music_volume(),
            "audio_volumes_loaded"
        );
        Ok(())
    }

    fn dispose(&mut self) {
        self.listeners.clear();
        self.changes.clear();
        self.cues.clear();
    }
}

impl<S: KeyValueStore + std::fmt::Debug> std::fmt::Debug for AudioManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("volumes", &self.volumes)
            .field("store", &self.store)
            .field("listeners", &self.listeners.len())
            .field("cues", &self.cues)
            .finish()
    }
}

/// Volume of one sound source, scaled by its category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioCategorizer {
    category: AudioCategory,
    unscaled_volume: f32,
    volume: f32,
}

impl AudioCategorizer {
    pub fn new(category: AudioCategory, unscaled_volume: f32, category_volume: f32) -> Self {
        let mut categorizer = Self {
            category,
            unscaled_volume,
            volume: unscaled_volume,
        };
        categorizer.update_volume(category_volume);
        categorizer
    }

    pub fn from_manager<S: KeyValueStore>(
        category: AudioCategory,
        unscaled_volume: f32,
        audio: &AudioManager<S>,
    ) -> Self {
        Self::new(category, unscaled_volume, audio.volume(category))
    }

    pub fn category(&self) -> AudioCategory {
        self.category
    }

    pub fn unscaled_volume(&self) -> f32 {
        self.unscaled_volume
    }

    /// Effective volume of the source.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_unscaled_volume(&mut self, unscaled_volume: f32, category_volume: f32) {
        self.unscaled_volume = unscaled_volume;
        self.update_volume(category_volume);
    }

    pub fn set_category(&mut self, category: AudioCategory, category_volume: f32) {
        self.category = category;
        self.update_volume(category_volume);
    }

    fn update_volume(&mut self, category_volume: f32) {
        // Global volume is applied by the output device.
        self.volume = match self.category {
            AudioCategory::Global => self.unscaled_volume,
            _ => clamp01(self.unscaled_volume * category_volume),
        };
    }
}

impl VolumeListener for AudioCategorizer {
    fn on_volume_changed(&mut self, change: VolumeChange) {
        if change.category == self.category {
            self.update_volume(change.current);
        }
    }
}

fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
