/// Carriers with published marketplace rate sheets.
pub const KNOWN_CARRIERS: [&str; 13] = [
    "ural", "abt", "atc", "cel", "guoo", "iml", "leader", "oyx", "rets", "tanais", "uni", "xy",
    "zto",
];

/// Human-readable carrier name; unknown ids are upper-cased.
pub fn carrier_name(id: &str) -> String {
    let name = match id.to_ascii_lowercase().as_str() {
        "ural" => "Ural",
        "abt" => "ABT",
        "atc" => "ATC",
        "cel" => "CEL",
        "guoo" => "Guoo",
        "iml" => "IML",
        "leader" => "Leader",
        "oyx" => "OYX",
        "rets" => "Rets",
        "tanais" => "Tanais",
        "uni" => "UNI",
        "xy" => "XY",
        "zto" => "ZTO",
        "chinapost" => "China Post",
        _ => return id.to_ascii_uppercase(),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrier_names() {
        assert_eq!(carrier_name("tanais"), "Tanais");
        assert_eq!(carrier_name("IML"), "IML");
        assert_eq!(carrier_name("newco"), "NEWCO");
        assert!(KNOWN_CARRIERS.iter().all(|c| !carrier_name(c).is_empty()));
    }
}
