//! Human-friendly place names from reverse-geocode address components.
//!
//! A single pass fills four slots (province, district, sub-locality and
//! route). Explicit administrative levels always win; the looser
//! `locality`, `administrative_area_level_2` and `sublocality*` types only
//! fill a slot that is still empty. The name is then composed from the most
//! specific slots available, falling back to the formatted address.

use crate::google_places::AddressComponent;

pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Country names stripped from the front of a formatted address.
const COUNTRY_PREFIXES: [&str; 3] = ["台灣", "臺灣", "Taiwan"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPlaceName {
    pub district: Option<String>,
    pub sub_locality: Option<String>,
    pub province: Option<String>,
    pub route: Option<String>,
    pub final_name: String,
}

#[derive(Default)]
struct Slots {
    province: String,
    district: String,
    sub_locality: String,
    route: String,
}

impl Slots {
    fn collect(components: &[AddressComponent]) -> Self {
        let mut slots = Slots::default();

        for c in components {
            let name = &c.long_name;

            if c.has_type("administrative_area_level_1") {
                slots.province = name.clone();
            }
            if c.has_type("administrative_area_level_3") {
                slots.district = name.clone();
            }
            if c.has_type("administrative_area_level_4") {
                slots.sub_locality = name.clone();
            }
            if c.has_type("route") {
                slots.route = name.clone();
            }

            if slots.district.is_empty()
                && c.has_type("locality")
                && !c.has_type("administrative_area_level_1")
            {
                slots.district = name.clone();
            }
            if slots.district.is_empty() && c.has_type("administrative_area_level_2") {
                slots.district = name.clone();
            }
            if slots.sub_locality.is_empty()
                && (c.has_type("sublocality_level_1") || c.has_type("sublocality"))
            {
                slots.sub_locality = name.clone();
            }
        }

        slots
    }
}

/// Derives the display name for a geocode result. Never returns an empty
/// `final_name`.
pub fn resolve(components: &[AddressComponent], formatted_address: &str) -> ResolvedPlaceName {
    let slots = Slots::collect(components);

    let composed = if !slots.district.is_empty() && !slots.sub_locality.is_empty() {
        format!("{}{}", slots.district, slots.sub_locality)
    } else if !slots.district.is_empty() {
        if slots.route.is_empty() {
            slots.district.clone()
        } else {
            format!("{} {}", slots.district, slots.route)
        }
    } else if !slots.province.is_empty() {
        slots.province.clone()
    } else {
        shorten_formatted_address(formatted_address)
    };

    let final_name = if composed.trim().is_empty() {
        UNKNOWN_LOCATION.to_string()
    } else {
        composed
    };

    ResolvedPlaceName {
        district: non_empty(slots.district),
        sub_locality: non_empty(slots.sub_locality),
        province: non_empty(slots.province),
        route: non_empty(slots.route),
        final_name,
    }
}

/// Drops a leading postal code and country name, then keeps the first
/// whitespace-delimited segment.
fn shorten_formatted_address(address: &str) -> String {
    let mut rest = address
        .trim_start()
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start();

    if let Some(stripped) = COUNTRY_PREFIXES.iter().find_map(|p| rest.strip_prefix(p)) {
        rest = stripped;
    }

    rest.split_whitespace().next().unwrap_or_default().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn taichung() -> Vec<AddressComponent> {
        vec![
            component("99", &["street_number"]),
            component("Taiwan Boulevard", &["route"]),
            component("Fulin Li", &["administrative_area_level_4", "political"]),
            component("Xitun District", &["administrative_area_level_3", "political"]),
            component("Taichung City", &["administrative_area_level_1", "political"]),
            component("Taiwan", &["country", "political"]),
        ]
    }

    #[test]
    fn district_and_sub_locality_are_joined_without_separator() {
        let resolved = resolve(&taichung(), "407 Taiwan, Taichung City ...");
        assert_eq!(resolved.final_name, "Xitun DistrictFulin Li");
        assert_eq!(resolved.province.as_deref(), Some("Taichung City"));
        assert_eq!(resolved.route.as_deref(), Some("Taiwan Boulevard"));
    }

    #[test]
    fn district_alone_gets_route_appended() {
        let components = vec![
            component("Taiwan Boulevard", &["route"]),
            component("Xitun District", &["administrative_area_level_3", "political"]),
        ];
        assert_eq!(resolve(&components, "").final_name, "Xitun District Taiwan Boulevard");
    }

    #[test]
    fn district_alone_without_route() {
        let components = vec![component("Xitun District", &["administrative_area_level_3"])];
        let resolved = resolve(&components, "");
        assert_eq!(resolved.final_name, "Xitun District");
        assert!(resolved.sub_locality.is_none());
    }

    #[test]
    fn locality_fills_district_unless_it_is_a_province() {
        let components = vec![
            component("Taipei City", &["locality", "administrative_area_level_1"]),
            component("Zhongzheng", &["sublocality_level_1", "sublocality"]),
        ];
        let resolved = resolve(&components, "");
        assert!(resolved.district.is_none());
        assert_eq!(resolved.final_name, "Taipei City");

        let components = vec![
            component("Hsinchu", &["locality", "political"]),
            component("East", &["sublocality", "political"]),
        ];
        assert_eq!(resolve(&components, "").final_name, "HsinchuEast");
    }

    #[test]
    fn level_two_is_a_district_fallback_only() {
        let components = vec![
            component("County Seat", &["administrative_area_level_2"]),
            component("Real District", &["administrative_area_level_3"]),
        ];
        assert_eq!(resolve(&components, "").final_name, "Real District");

        let components = vec![component("County Seat", &["administrative_area_level_2"])];
        assert_eq!(resolve(&components, "").final_name, "County Seat");
    }

    #[test]
    fn explicit_levels_override_earlier_fallbacks() {
        let components = vec![
            component("Loose Town", &["locality"]),
            component("Loose Li", &["sublocality"]),
            component("Strict District", &["administrative_area_level_3"]),
            component("Strict Li", &["administrative_area_level_4"]),
        ];
        assert_eq!(resolve(&components, "").final_name, "Strict DistrictStrict Li");
    }

    #[test]
    fn sub_locality_alone_falls_through_to_province() {
        let components = vec![
            component("Fulin Li", &["administrative_area_level_4"]),
            component("Taichung City", &["administrative_area_level_1"]),
        ];
        assert_eq!(resolve(&components, "").final_name, "Taichung City");
    }

    #[test]
    fn formatted_address_fallback_strips_postcode_and_country() {
        let resolved = resolve(&[], "407台灣台中市西屯區 台灣大道三段99號");
        assert_eq!(resolved.final_name, "台中市西屯區");

        let resolved = resolve(&[], "10048 Taiwan Taipei City Zhongzheng");
        assert_eq!(resolved.final_name, "Taipei");

        let resolved = resolve(&[component("Pacific", &["natural_feature"])], "Somewhere Remote");
        assert_eq!(resolved.final_name, "Somewhere");
    }

    #[test]
    fn never_returns_an_empty_name() {
        assert_eq!(resolve(&[], "").final_name, UNKNOWN_LOCATION);
        assert_eq!(resolve(&[], "   ").final_name, UNKNOWN_LOCATION);
        assert_eq!(resolve(&[], "12345 台灣").final_name, UNKNOWN_LOCATION);
    }
}
