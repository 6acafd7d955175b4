//! Default property bundles per control type.
//!
//! Each control type is the union of a common group and a few capability
//! groups (response, cursor, grid, ...). When two groups name the same key
//! the later one wins, so a GROUP's `outlineStyle` of 0 overrides the common
//! default of 1. Bundles never include `frame`; that comes from
//! [`Control::new`](crate::model::Control::new).

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::model::{Color, ControlType, Property};

lazy_static! {
    static ref BUNDLES: FxHashMap<ControlType, Vec<Property>> = ControlType::ALL
        .into_iter()
        .map(|ty| (ty, build(ty)))
        .collect();
}

/// Returns the default properties for a control type, in bundle order.
pub fn default_properties(control_type: ControlType) -> &'static [Property] {
    BUNDLES
        .get(&control_type)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn build(control_type: ControlType) -> Vec<Property> {
    use ControlType::*;

    let groups: Vec<fn() -> Vec<Property>> = match control_type {
        Box => vec![common, shape],
        Button => vec![common, shape, button],
        Label => vec![common, text, label],
        Text => vec![common, text],
        Fader => vec![common, response, grid, cursor, fader],
        Xy => vec![common, response, cursor, xy],
        Radial => vec![common, response, grid, cursor, radial],
        Encoder => vec![common, response, grid, encoder],
        Radar => vec![common, cursor, lines, xy],
        Radio => vec![common, radio],
        Group => vec![common, group],
        Grid => vec![common, grid_container],
        Pager => vec![common, group, pager],
        Page => vec![common, group, page],
    };

    let mut out: Vec<Property> = Vec::new();
    for property in groups.into_iter().flat_map(|group| group()) {
        match out.iter_mut().find(|p| p.key == property.key) {
            Some(existing) => *existing = property,
            None => out.push(property),
        }
    }
    out
}

fn common() -> Vec<Property> {
    vec![
        Property::string("name", ""),
        Property::string("tag", ""),
        Property::string("script", ""),
        Property::color("color", Color::new(0.25, 0.25, 0.25, 1.0)),
        Property::bool("locked", false),
        Property::bool("visible", true),
        Property::bool("interactive", true),
        Property::bool("background", true),
        Property::bool("outline", true),
        // 0 full, 1 corners, 2 edges
        Property::int("outlineStyle", 1),
        Property::bool("grabFocus", true),
        Property::int("pointerPriority", 0),
        Property::float("cornerRadius", 0.0),
        // 0 north, 1 east, 2 south, 3 west
        Property::int("orientation", 0),
    ]
}

fn shape() -> Vec<Property> {
    vec![Property::int("shape", 0)]
}

fn group() -> Vec<Property> {
    vec![Property::int("outlineStyle", 0), Property::bool("grabFocus", false)]
}

fn grid() -> Vec<Property> {
    vec![Property::bool("grid", true), Property::int("gridSteps", 10)]
}

fn response() -> Vec<Property> {
    vec![Property::int("response", 0), Property::int("responseFactor", 100)]
}

fn cursor() -> Vec<Property> {
    vec![Property::bool("cursor", true), Property::int("cursorDisplay", 0)]
}

fn lines() -> Vec<Property> {
    vec![Property::bool("lines", true), Property::int("linesDisplay", 0)]
}

fn xy() -> Vec<Property> {
    vec![
        Property::bool("lockX", false),
        Property::bool("lockY", false),
        Property::bool("gridX", true),
        Property::bool("gridY", true),
        Property::int("gridStepsX", 10),
        Property::int("gridStepsY", 10),
    ]
}

fn text() -> Vec<Property> {
    vec![
        Property::int("font", 0),
        Property::int("textSize", 14),
        Property::color("textColor", Color::new(1.0, 1.0, 1.0, 1.0)),
        // 1 left, 2 center, 3 right
        Property::int("textAlignH", 2),
    ]
}

fn button() -> Vec<Property> {
    vec![
        Property::int("buttonType", 0),
        Property::bool("press", true),
        Property::bool("release", true),
        Property::bool("valuePosition", false),
    ]
}

fn label() -> Vec<Property> {
    vec![Property::int("textLength", 0), Property::bool("textClip", true)]
}

fn fader() -> Vec<Property> {
    vec![Property::bool("bar", true), Property::int("barDisplay", 0)]
}

fn radial() -> Vec<Property> {
    vec![
        Property::int("outlineStyle", 0),
        Property::bool("inverted", false),
        Property::bool("centered", false),
    ]
}

fn encoder() -> Vec<Property> {
    vec![Property::int("outlineStyle", 0)]
}

fn radio() -> Vec<Property> {
    vec![Property::int("steps", 5), Property::int("radioType", 0)]
}

fn grid_container() -> Vec<Property> {
    vec![
        Property::bool("grabFocus", false),
        Property::bool("exclusive", false),
        Property::int("gridNaming", 0),
        Property::int("gridOrder", 0),
        Property::int("gridStart", 0),
        Property::int("gridType", 4),
        Property::int("gridX", 2),
        Property::int("gridY", 2),
    ]
}

fn pager() -> Vec<Property> {
    vec![
        Property::bool("tabLabels", true),
        Property::bool("tabbar", true),
        Property::bool("tabbarDoubleTap", false),
        Property::int("tabbarSize", 40),
        Property::int("textSizeOff", 14),
        Property::int("textSizeOn", 14),
    ]
}

fn page() -> Vec<Property> {
    vec![
        Property::color("tabColorOff", Color::new(0.25, 0.25, 0.25, 1.0)),
        Property::color("tabColorOn", Color::new(0.0, 0.0, 0.0, 0.0)),
        Property::string("tabLabel", "1"),
        Property::color("textColorOff", Color::new(1.0, 1.0, 1.0, 1.0)),
        Property::color("textColorOn", Color::new(1.0, 1.0, 1.0, 1.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;

    fn get<'a>(props: &'a [Property], key: &str) -> Option<&'a PropertyValue> {
        props.iter().find(|p| p.key == key).map(|p| &p.value)
    }

    #[test]
    fn test_every_type_has_common_group() {
        for ty in ControlType::ALL {
            let props = default_properties(ty);
            assert!(get(props, "name").is_some(), "{ty} lacks name");
            assert!(get(props, "color").is_some(), "{ty} lacks color");
            assert!(get(props, "frame").is_none(), "{ty} bundle has a frame");
        }
    }

    #[test]
    fn test_keys_unique() {
        for ty in ControlType::ALL {
            let props = default_properties(ty);
            let mut keys: Vec<_> = props.iter().map(|p| p.key.as_str()).collect();
            let len = keys.len();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), len, "{ty} has duplicate keys");
        }
    }

    #[test]
    fn test_later_groups_override() {
        let group = default_properties(ControlType::Group);
        assert_eq!(get(group, "outlineStyle"), Some(&PropertyValue::Int(0)));
        assert_eq!(get(group, "grabFocus"), Some(&PropertyValue::Bool(false)));

        let button = default_properties(ControlType::Button);
        assert_eq!(get(button, "outlineStyle"), Some(&PropertyValue::Int(1)));
        assert_eq!(get(button, "grabFocus"), Some(&PropertyValue::Bool(true)));
    }

    #[test]
    fn test_capabilities() {
        let fader = default_properties(ControlType::Fader);
        assert_eq!(get(fader, "responseFactor"), Some(&PropertyValue::Int(100)));
        assert_eq!(get(fader, "gridSteps"), Some(&PropertyValue::Int(10)));
        assert!(get(fader, "textSize").is_none());

        let label = default_properties(ControlType::Label);
        assert_eq!(get(label, "textSize"), Some(&PropertyValue::Int(14)));
        assert_eq!(get(label, "textClip"), Some(&PropertyValue::Bool(true)));
    }
}
