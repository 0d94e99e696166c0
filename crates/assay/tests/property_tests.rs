//! Property-based tests for severity parsing and dataset construction.

use proptest::prelude::*;

use assay::{AssayError, DataTable, Severity};

const ORDINALS: [u8; 5] = [10, 20, 30, 40, 50];

proptest! {
    #[test]
    fn unknown_ordinals_are_rejected(ordinal in any::<u8>()) {
        prop_assume!(!ORDINALS.contains(&ordinal));

        prop_assert!(
            matches!(Severity::try_from(ordinal), Err(AssayError::InvalidLogLevel(_))),
            "try_from accepted ordinal {}",
            ordinal
        );
        prop_assert!(ordinal.to_string().parse::<Severity>().is_err());
    }

    #[test]
    fn severity_order_follows_ordinals(a in 0usize..5, b in 0usize..5) {
        let (sa, sb) = (Severity::ALL[a], Severity::ALL[b]);
        prop_assert_eq!(sa < sb, sa.ordinal() < sb.ordinal());
    }

    #[test]
    fn level_names_parse_in_any_case(index in 0usize..5, upper in proptest::collection::vec(any::<bool>(), 8)) {
        let severity = Severity::ALL[index];
        let name: String = severity
            .as_str()
            .chars()
            .zip(upper.iter().cycle())
            .map(|(c, &up)| if up { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
            .collect();

        prop_assert_eq!(name.parse::<Severity>().unwrap(), severity);
    }

    #[test]
    fn tables_keep_row_order_and_width(
        rows in proptest::collection::vec(proptest::collection::vec("[a-z0-9]{0,4}", 0..6), 0..20)
    ) {
        let headers = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let table = DataTable::new(headers, rows.clone()).unwrap();

        prop_assert_eq!(table.row_count(), rows.len());
        for (i, original) in rows.iter().enumerate() {
            let row: Vec<&str> = (0..3).map(|c| table.get(i, c).unwrap()).collect();
            let expected: Vec<&str> = (0..3)
                .map(|c| original.get(c).map(String::as_str).unwrap_or(""))
                .collect();
            prop_assert_eq!(row, expected);
        }
    }
}
