use crate::http_log::RecordField;

#[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct DataDisplayOptions {
    /// Names of the record fields shown as columns of the main list
    main_list_fields: Vec<String>,

    /// The field to use to highlight other related log entries
    ///
    /// WARNING: This must be a valid index into the list as this is assumed in method implementations
    emphasize_if_matching_field_idx: Option<usize>,
}

impl DataDisplayOptions {
    pub fn main_list_fields(&self) -> &[String] {
        &self.main_list_fields
    }
    pub fn emphasize_if_matching_field_idx(&self) -> Option<usize> {
        self.emphasize_if_matching_field_idx
    }
}

impl Default for DataDisplayOptions {
    fn default() -> Self {
        Self {
            // TODO 3: Add ability to show, select and reorder selected fields
            main_list_fields: [
                RecordField::Timestamp,
                RecordField::ConnectionId,
                RecordField::SourceAddress,
                RecordField::DestAddress,
                RecordField::Method,
                RecordField::Uri,
                RecordField::StatusCode,
            ]
            .into_iter()
            .map(|field| field.name().to_string())
            .collect(),
            emphasize_if_matching_field_idx: Some(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns_are_record_fields() {
        let options = DataDisplayOptions::default();
        for name in options.main_list_fields() {
            assert!(RecordField::from_name(name).is_some(), "unknown field {name}");
        }
        let idx = options.emphasize_if_matching_field_idx().unwrap();
        assert_eq!(options.main_list_fields()[idx], "connection_id");
    }
}
