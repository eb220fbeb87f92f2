use crate::config::AppSettings;
use crate::core::resolver::PathResolver;
use crate::core::store::{DurableStore, JsonStore};
use crate::models::activation::ActivationRecord;
use crate::models::catalog::Catalog;
use crate::models::error::SError;
use crate::models::mod_dto::Mod;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, instrument, warn};

pub type CatalogStore = Box<dyn DurableStore<Catalog>>;
pub type ActivationStore = Box<dyn DurableStore<ActivationRecord>>;

/// Owns the catalog and activation state and runs every mod operation.
///
/// Operations mutate files first and only then commit the in-memory state to
/// the stores, so a failing file step never leaves a half-written catalog.
pub struct ModEngine {
    pub paths: PathResolver,
    pub(crate) catalog: Catalog,
    pub(crate) activation: ActivationRecord,
    catalog_store: CatalogStore,
    activation_store: ActivationStore,
}

impl ModEngine {
    /// Opens the engine with JSON stores at the resolver's locations.
    pub fn open(paths: PathResolver) -> Result<Self, SError> {
        let catalog_store: CatalogStore =
            Box::new(JsonStore::<Catalog>::new(paths.catalog_store_location()));
        let activation_store: ActivationStore =
            Box::new(JsonStore::<ActivationRecord>::new(paths.activation_store_location()));
        Self::with_stores(paths, catalog_store, activation_store)
    }

    /// Opens the engine for the data root and game described by `settings`.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SError> {
        Self::open(PathResolver::new(&settings.home, settings.layout.clone()))
    }

    #[instrument(skip_all, fields(home = %paths.home))]
    pub fn with_stores(
        paths: PathResolver,
        catalog_store: CatalogStore,
        activation_store: ActivationStore,
    ) -> Result<Self, SError> {
        paths.ensure_dirs()?;

        let catalog = catalog_store.load()?;
        let activation = activation_store.load()?;

        let mut engine = Self {
            paths,
            catalog,
            activation,
            catalog_store,
            activation_store,
        };
        engine.reconcile()?;

        info!(
            "Engine ready: {} mod(s), active: {}",
            engine.catalog.len(),
            engine.active_mod_name().unwrap_or("vanilla")
        );
        Ok(engine)
    }

    /// Repairs state written by older versions and enforces that the active
    /// reference points at a catalogued mod.
    fn reconcile(&mut self) -> Result<(), SError> {
        let mut catalog_dirty = self.catalog.take_repaired();
        let mut state_dirty = false;

        for m in self.catalog.iter_mut() {
            let before = m.clone();
            for p in m.patch_files.iter_mut() {
                *p = self.paths.absolutize(p);
            }
            if let Some(p) = m.music_file.as_mut() {
                *p = self.paths.absolutize(p);
            }
            catalog_dirty |= before != *m;
        }

        if let Some(reference) = self.activation.active_mod.clone() {
            if self.catalog.get(&reference).is_none() {
                match self.catalog.by_name(&reference) {
                    Some(m) => {
                        info!("Migrating active mod reference '{reference}' to id {}", m.id);
                        self.activation.active_mod = Some(m.id.clone());
                    }
                    None => {
                        warn!("Active mod '{reference}' is not in the catalog, clearing it");
                        self.activation.active_mod = None;
                    }
                }
                state_dirty = true;
            }
        }

        if catalog_dirty {
            self.save_catalog()?;
        }
        if state_dirty {
            self.save_activation()?;
        }
        Ok(())
    }

    pub(crate) fn save_catalog(&self) -> Result<(), SError> {
        self.catalog_store.save(&self.catalog)
    }

    pub(crate) fn save_activation(&self) -> Result<(), SError> {
        self.activation_store.save(&self.activation)
    }

    // --- Queries ---

    /// Catalog snapshot, sorted by name.
    pub fn mods(&self) -> Vec<Mod> {
        self.catalog.sorted_by_name().into_iter().cloned().collect()
    }

    pub fn get_mod(&self, name: &str) -> Option<&Mod> {
        self.catalog.by_name(name)
    }

    pub(crate) fn require_mod(&self, name: &str) -> Result<&Mod, SError> {
        self.catalog
            .by_name(name)
            .ok_or_else(|| SError::ModNotFound(name.to_string()))
    }

    pub fn active_mod(&self) -> Option<&Mod> {
        self.activation
            .active_mod
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }

    pub fn active_mod_name(&self) -> Option<&str> {
        self.active_mod().map(|m| m.name.as_str())
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active_mod_name() == Some(name)
    }

    pub fn activation(&self) -> &ActivationRecord {
        &self.activation
    }

    /// First-run status: has a game folder been accepted yet.
    pub fn is_setup_complete(&self) -> bool {
        self.activation.game_music_path.is_some()
    }

    pub fn live_music_path(&self) -> Option<&Utf8Path> {
        self.activation.game_music_path.as_deref()
    }

    pub fn live_patch_path(&self) -> &Utf8Path {
        self.paths.live_patch_path()
    }

    pub fn mod_folder(&self, name: &str) -> Utf8PathBuf {
        self.paths.mod_folder(name)
    }

    // --- First run ---

    /// Accepts the game installation folder (or its music file) and records
    /// the live music path.
    #[instrument(skip(self))]
    pub fn select_game_folder(&mut self, selected: &Utf8Path) -> Result<Utf8PathBuf, SError> {
        let music = self.paths.validate_game_folder(selected)?;
        info!("Game music file set to {music}");
        self.activation.game_music_path = Some(music.clone());
        self.save_activation()?;
        Ok(music)
    }

    pub fn set_last_folder(&mut self, folder: &Utf8Path) -> Result<(), SError> {
        self.activation.last_folder = folder.to_string();
        self.save_activation()
    }
}
