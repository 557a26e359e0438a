use serde::Serialize;

use crate::domain::Winner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriverAsset {
    pub main: &'static str,
    pub helmet: &'static str,
}

const NORRIS_ASSET: DriverAsset = DriverAsset {
    main: "norris.avif",
    helmet: "norris-helmet.png",
};

// Drivers without dedicated artwork reuse the Norris set.
pub const PLACEHOLDER_ASSET: DriverAsset = NORRIS_ASSET;

const DRIVER_ASSETS: &[(&str, DriverAsset)] = &[("Lando Norris", NORRIS_ASSET)];

pub fn asset_for(driver: &str) -> &'static DriverAsset {
    DRIVER_ASSETS
        .iter()
        .find(|(name, _)| *name == driver)
        .map(|(_, asset)| asset)
        .unwrap_or(&PLACEHOLDER_ASSET)
}

pub fn asset_for_winner(winner: &Winner) -> &'static DriverAsset {
    match winner {
        Winner::Driver(name) => asset_for(name),
        Winner::Unknown => &PLACEHOLDER_ASSET,
    }
}
