use foundation::Coordinate;

/// Landmark the viewer jumps to when no route is selected.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocationPreset {
    pub coordinate: Coordinate,
    pub name: &'static str,
}

const fn preset(latitude: f64, longitude: f64, name: &'static str) -> LocationPreset {
    LocationPreset {
        coordinate: Coordinate::new(latitude, longitude),
        name,
    }
}

pub const LOCATION_PRESETS: [LocationPreset; 10] = [
    preset(35.6762, 139.6503, "Tokyo Tower"),
    preset(35.3606, 138.7274, "Mount Fuji"),
    preset(34.0522, -118.2437, "Los Angeles"),
    preset(40.7589, -73.9851, "Times Square"),
    preset(51.5007, -0.1246, "London"),
    preset(48.8584, 2.2945, "Eiffel Tower"),
    preset(41.8902, 12.4922, "Colosseum"),
    preset(35.6586, 139.7454, "Imperial Palace"),
    preset(34.6937, 135.5023, "Osaka Castle"),
    preset(35.0116, 135.7681, "Kiyomizu-dera"),
];

/// Crossings needed to move to the next preset.
pub const CROSSINGS_PER_PRESET: u32 = 10;

/// Preset for a running crossing total; cycles through the list.
pub fn preset_for_count(total: u32) -> &'static LocationPreset {
    let index = (total / CROSSINGS_PER_PRESET) as usize % LOCATION_PRESETS.len();
    &LOCATION_PRESETS[index]
}
