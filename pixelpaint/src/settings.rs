const DOCUMENTATION: &str = r#"# Pixelpaint settings. You may edit this file, but be aware that formatting and comments will not
# be preserved.

# canvas = [width, height] of documents created with --new.
# background = [r, g, b, a] the visible layers are flattened onto when exporting.
# output = default path of the exported png, relative to the working directory.

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas: [u32; 2],
    pub background: [u8; 4],
    pub output: std::path::PathBuf,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas: [64, 64],
            background: [255, 255, 255, 255],
            output: "out.png".into(),
        }
    }
}
impl Settings {
    const FILENAME: &'static str = "settings.toml";
    /// Load the user's settings, or defaults if they're unavailable for some reason.
    #[must_use]
    pub fn load_or_default() -> Self {
        let Some(mut path) = preferences_dir() else {
            log::warn!("No preferences dir found, using default settings.");
            return Self::default();
        };
        path.push(Self::FILENAME);
        let settings: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(&path)?;
            let settings: Self = toml::from_str(&string)?;
            Ok(settings)
        };
        match settings {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Settings at {path:?} weren't available, defaulting: {e}");
                Self::default()
            }
        }
    }
    pub fn save(&self) -> anyhow::Result<std::path::PathBuf> {
        let mut preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(&preferences, string)?;
        Ok(preferences)
    }
}
