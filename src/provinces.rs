//! ISO 3166-2:AR subdivision codes and their display names.

pub const ISO_3166_2_AR: &[(&str, &str)] = &[
    ("AR-C", "Ciudad Autónoma de Buenos Aires"),
    ("AR-B", "Buenos Aires"),
    ("AR-K", "Catamarca"),
    ("AR-H", "Chaco"),
    ("AR-U", "Chubut"),
    ("AR-X", "Córdoba"),
    ("AR-W", "Corrientes"),
    ("AR-E", "Entre Ríos"),
    ("AR-P", "Formosa"),
    ("AR-Y", "Jujuy"),
    ("AR-L", "La Pampa"),
    ("AR-F", "La Rioja"),
    ("AR-M", "Mendoza"),
    ("AR-N", "Misiones"),
    ("AR-Q", "Neuquén"),
    ("AR-R", "Río Negro"),
    ("AR-A", "Salta"),
    ("AR-J", "San Juan"),
    ("AR-D", "San Luis"),
    ("AR-Z", "Santa Cruz"),
    ("AR-S", "Santa Fe"),
    ("AR-G", "Santiago del Estero"),
    ("AR-V", "Tierra del Fuego"),
    ("AR-T", "Tucumán"),
];

pub fn province_name(code: &str) -> Option<&'static str> {
    ISO_3166_2_AR
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let mut codes = ISO_3166_2_AR.iter().map(|(code, _)| *code).collect::<Vec<_>>();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ISO_3166_2_AR.len());
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(province_name("AR-C"), Some("Ciudad Autónoma de Buenos Aires"));
        assert_eq!(province_name("ar-c"), None);
        assert_eq!(province_name("AR-ZZ"), None);
    }
}
