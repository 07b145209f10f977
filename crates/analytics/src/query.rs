use serde_json::Value;

pub const ENGAGE_STATS: [&str; 2] = ["engage", "stats"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Wire form of the value; lists travel as JSON arrays.
    pub fn encoded(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect()).to_string()
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// A read-only query against the Mixpanel data export API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalyticsQuery {
    endpoint: Vec<String>,
    parameters: Vec<(String, ParamValue)>,
    selector: Option<String>,
}

impl AnalyticsQuery {
    pub fn new<I, S>(endpoint: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoint: endpoint.into_iter().map(Into::into).collect(),
            parameters: Vec::new(),
            selector: None,
        }
    }

    pub fn engage_stats() -> Self {
        Self::new(ENGAGE_STATS)
    }

    /// Sets a parameter, replacing an earlier value for the same key in place.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.parameters.push((key, value)),
        }
        self
    }

    pub fn selector(mut self, expression: impl Into<String>) -> Self {
        self.selector = Some(expression.into());
        self
    }

    pub fn endpoint(&self) -> &[String] {
        &self.endpoint
    }

    pub fn endpoint_path(&self) -> String {
        self.endpoint.join("/")
    }

    pub fn parameters(&self) -> &[(String, ParamValue)] {
        &self.parameters
    }

    pub fn selector_expression(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Final parameter list in merge order: caller parameters, selector, then the
    /// `api_key`/`format`/`expire` defaults. `format` is always forced to `json`.
    pub(crate) fn merged_parameters(&self, api_key: &str, expire_at: i64) -> Vec<(String, String)> {
        let mut merged = self
            .parameters
            .iter()
            .map(|(key, value)| (key.clone(), value.encoded()))
            .collect::<Vec<_>>();

        if let Some(selector) = &self.selector {
            set_if_absent(&mut merged, "selector", selector.clone());
        }
        set_if_absent(&mut merged, "api_key", api_key.to_owned());
        match merged.iter_mut().find(|(key, _)| key == "format") {
            Some(slot) => slot.1 = "json".to_owned(),
            None => merged.push(("format".to_owned(), "json".to_owned())),
        }
        set_if_absent(&mut merged, "expire", expire_at.to_string());

        merged
    }
}

fn set_if_absent(parameters: &mut Vec<(String, String)>, key: &str, value: String) {
    if !parameters.iter().any(|(existing, _)| existing == key) {
        parameters.push((key.to_owned(), value));
    }
}

/// People-property selector expressions.
pub mod selector {
    pub fn last_seen_since(cutoff: &str) -> String {
        format!(r#"properties["$last_seen"] >= "{}""#, escape_literal(cutoff))
    }

    pub fn country_code_is(code: &str) -> String {
        format!(r#"properties["$country_code"] == "{}""#, escape_literal(code))
    }

    fn escape_literal(value: &str) -> String {
        value.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

#[cfg(test)]
mod tests {
    use super::{selector, AnalyticsQuery, ParamValue};

    #[test]
    fn merge_appends_defaults_after_caller_parameters() {
        let query = AnalyticsQuery::engage_stats()
            .param("where", "x")
            .selector(selector::country_code_is("AT"));

        let merged = query.merged_parameters("key-1", 1_700_000_600);
        let keys = merged.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();

        assert_eq!(keys, ["where", "selector", "api_key", "format", "expire"]);
        assert_eq!(merged[1].1, r#"properties["$country_code"] == "AT""#);
        assert_eq!(merged[4].1, "1700000600");
    }

    #[test]
    fn merge_keeps_explicit_api_key_and_expire_but_forces_json() {
        let query = AnalyticsQuery::engage_stats()
            .param("api_key", "explicit")
            .param("expire", "42")
            .param("format", "csv");

        let merged = query.merged_parameters("configured", 999);

        assert_eq!(
            merged,
            vec![
                ("api_key".to_owned(), "explicit".to_owned()),
                ("expire".to_owned(), "42".to_owned()),
                ("format".to_owned(), "json".to_owned()),
            ]
        );
    }

    #[test]
    fn list_values_are_json_encoded() {
        let value = ParamValue::from(vec!["$email".to_owned(), "$city".to_owned()]);

        assert_eq!(value.encoded(), r#"["$email","$city"]"#);
    }

    #[test]
    fn param_replaces_existing_key_in_place() {
        let query = AnalyticsQuery::new(["segmentation"]).param("event", "a").param("event", "b");

        assert_eq!(query.parameters(), &[("event".to_owned(), ParamValue::from("b"))]);
        assert_eq!(query.endpoint_path(), "segmentation");
    }

    #[test]
    fn selector_literals_are_escaped() {
        assert_eq!(
            selector::country_code_is(r#"AT" or true"#),
            r#"properties["$country_code"] == "AT\" or true""#
        );
        assert_eq!(
            selector::last_seen_since("2024-06-24T14:00:00"),
            r#"properties["$last_seen"] >= "2024-06-24T14:00:00""#
        );
    }
}
