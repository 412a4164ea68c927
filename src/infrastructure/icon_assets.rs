// Icon asset discovery
use crate::application::icon_resolver::{all_keys, asset_file_name, asset_url, GeoIconResolver};
use crate::infrastructure::config::IconSettings;
use std::collections::HashMap;

/// Build the resolver from config. With a directory configured, only icons
/// present on disk are registered; everything else renders as a fallback.
pub fn load_icon_resolver(settings: &IconSettings) -> GeoIconResolver {
    let Some(directory) = settings.directory.as_ref() else {
        return GeoIconResolver::with_default_assets(&settings.url_prefix);
    };

    let mut assets = HashMap::new();
    let mut missing = Vec::new();
    for key in all_keys() {
        let file_name = asset_file_name(key);
        if directory.join(&file_name).is_file() {
            assets.insert(key, asset_url(&settings.url_prefix, key));
        } else {
            missing.push(file_name);
        }
    }

    if !missing.is_empty() {
        tracing::warn!(
            "{} icon assets missing from {}, fallback markers will be used: {}",
            missing.len(),
            directory.display(),
            missing.join(", ")
        );
    }

    GeoIconResolver::new(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::marker::MarkerIcon;
    use crate::domain::well::{LiftType, WellStatus};
    use std::fs;

    #[test]
    fn test_only_present_files_are_registered() {
        let dir = std::env::temp_dir().join(format!("wellviz-icons-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("nf-active.svg"), "<svg/>").unwrap();
        fs::write(dir.join("esp-abandoned.svg"), "<svg/>").unwrap();

        let resolver = load_icon_resolver(&IconSettings {
            url_prefix: "/static/icons".to_string(),
            directory: Some(dir.clone()),
        });
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(resolver.registered(), 2);
        assert_eq!(
            resolver.resolve(LiftType::NaturalFlow, WellStatus::Active).icon,
            MarkerIcon::Asset { url: "/static/icons/nf-active.svg".to_string() }
        );
        assert!(resolver.resolve(LiftType::GasLift, WellStatus::Active).is_fallback());
    }

    #[test]
    fn test_without_directory_registers_everything() {
        let resolver = load_icon_resolver(&IconSettings::default());
        assert_eq!(resolver.registered(), 9);
    }
}
