//! Header alias table: which export column headers map to which canonical
//! field.
//!
//! The built-in table covers the English and Ukrainian spellings produced by
//! the ads manager export. Extra locales are added as data, either by
//! extending [`DEFAULT_ALIASES`] or by loading a JSON object of
//! `"header": "fieldId"` pairs and layering it over the built-in table.
use crate::types::Field;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::io::Read;

/// Built-in aliases. Keys are written already normalized.
pub const DEFAULT_ALIASES: &[(&str, Field)] = &[
    // Dates
    ("reporting starts", Field::ReportingStart),
    ("дата початку звіту", Field::ReportingStart),
    ("reporting ends", Field::ReportingEnd),
    ("дата завершення звіту", Field::ReportingEnd),
    // Identifiers
    ("campaign name", Field::CampaignName),
    ("назва кампанії", Field::CampaignName),
    ("ad set name", Field::AdSetName),
    ("назва групи оголошень", Field::AdSetName),
    ("ad name", Field::AdName),
    ("назва оголошення", Field::AdName),
    ("country", Field::Country),
    ("країна", Field::Country),
    // Delivery and budget
    ("ad set delivery", Field::AdSetDelivery),
    ("доставка групи оголошень", Field::AdSetDelivery),
    ("ad set budget", Field::AdSetBudget),
    ("бюджет групи оголошень", Field::AdSetBudget),
    ("budget type", Field::BudgetType),
    ("тип бюджету", Field::BudgetType),
    // Core performance
    ("amount spent (usd)", Field::AmountSpentUsd),
    ("витрачена сума (usd)", Field::AmountSpentUsd),
    ("amount spent", Field::AmountSpentUsd),
    ("витрати", Field::AmountSpentUsd),
    ("reach", Field::Reach),
    ("охоплення", Field::Reach),
    ("impressions", Field::Impressions),
    ("покази", Field::Impressions),
    ("link clicks", Field::LinkClicks),
    ("кліки за посиланням", Field::LinkClicks),
    ("clicks (all)", Field::LinkClicks),
    // Results
    ("results", Field::Results),
    ("результати", Field::Results),
    ("result indicator", Field::ResultIndicator),
    ("індикатор результату", Field::ResultIndicator),
    ("cost per result", Field::CostPerResult),
    ("ціна за результат", Field::CostPerResult),
    ("conversion value", Field::ValueSum),
    ("value sum", Field::ValueSum),
    ("сума цінності", Field::ValueSum),
    ("сума цінності конверсії для покупок", Field::ValueSum),
    ("purchase roas [usd]", Field::TotalRoas),
    ("total roas", Field::TotalRoas),
    ("roas загалом", Field::TotalRoas),
    ("roas для покупок загалом", Field::TotalRoas),
    // Engagement
    ("cpm (cost per 1,000 impressions)", Field::Cpm),
    ("cpm (вартість за 1000 показів)", Field::Cpm),
    ("ctr (all)", Field::CtrAll),
    ("ctr (усі)", Field::CtrAll),
    ("ctr (link click-through rate)", Field::CtrAll),
    ("cpc (all) (cost per link click)", Field::CpcAll),
    ("cpc (усі) (вартість за клік за посиланням)", Field::CpcAll),
    ("cpc (cost per link click)", Field::CpcAll),
    // App
    ("app installs", Field::AppInstalls),
    ("установлення додатка", Field::AppInstalls),
    ("mobile app installs", Field::AppInstalls),
    ("in-app purchases", Field::InAppPurchases),
    ("покупки в додатку", Field::InAppPurchases),
    ("in-app purchases conversion value", Field::InAppPurchasesConversionValue),
    ("сума цінності конверсії покупок у додатку", Field::InAppPurchasesConversionValue),
    ("cost per in-app purchase", Field::CostPerInAppPurchase),
    ("ціна за покупку в додатку", Field::CostPerInAppPurchase),
    // Video
    ("3-second video plays", Field::VideoPlays3Sec),
    ("3-секундні перегляди відео", Field::VideoPlays3Sec),
    ("video plays at 25%", Field::VideoPlaysTo25Percent),
    ("відтворення відео до 25%", Field::VideoPlaysTo25Percent),
    ("video plays at 50%", Field::VideoPlaysTo50Percent),
    ("відтворення відео до 50%", Field::VideoPlaysTo50Percent),
    ("video plays at 75%", Field::VideoPlaysTo75Percent),
    ("відтворення відео до 75%", Field::VideoPlaysTo75Percent),
    ("video plays at 95%", Field::VideoPlaysTo95Percent),
    ("відтворення відео до 95%", Field::VideoPlaysTo95Percent),
    ("video plays at 100%", Field::VideoPlaysTo100Percent),
    ("відтворення відео до 100%", Field::VideoPlaysTo100Percent),
    ("cost per 3-second video play", Field::CostPer3SecVideoPlay),
    ("ціна за 3-секундний перегляд відео", Field::CostPer3SecVideoPlay),
    // Other
    ("frequency", Field::Frequency),
    ("частота", Field::Frequency),
    ("unique link clicks", Field::UniqueLinkClicks),
    ("унікальні кліки за посиланням", Field::UniqueLinkClicks),
];

static BUILTIN: Lazy<HeaderAliasTable> =
    Lazy::new(|| HeaderAliasTable::from_pairs(DEFAULT_ALIASES.iter().copied()));

/// Lower-case and trim a header so lookups ignore case and padding.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderAliasTable {
    aliases: HashMap<String, Field>,
}

impl HeaderAliasTable {
    /// The process-wide built-in table.
    pub fn builtin() -> &'static HeaderAliasTable {
        &BUILTIN
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Field)>,
        S: AsRef<str>,
    {
        let aliases = pairs
            .into_iter()
            .map(|(alias, field)| (normalize_header(alias.as_ref()), field))
            .filter(|(alias, _)| !alias.is_empty())
            .collect();
        HeaderAliasTable { aliases }
    }

    /// Read a JSON object of `"header": "fieldId"` pairs.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Field> = serde_json::from_str(json)?;
        Ok(Self::from_pairs(raw))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, Field> = serde_json::from_reader(reader)?;
        Ok(Self::from_pairs(raw))
    }

    /// A new table holding `self` plus `extra`; `extra` wins on conflicts.
    pub fn with_overrides(&self, extra: &HeaderAliasTable) -> Self {
        let mut aliases = self.aliases.clone();
        aliases.extend(extra.aliases.iter().map(|(k, v)| (k.clone(), *v)));
        HeaderAliasTable { aliases }
    }

    pub fn lookup(&self, header: &str) -> Option<Field> {
        self.aliases.get(&normalize_header(header)).copied()
    }

    /// Every alias for `field`, sorted.
    pub fn aliases_for(&self, field: Field) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .aliases
            .iter()
            .filter(|(_, f)| **f == field)
            .map(|(alias, _)| alias.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Field)> + '_ {
        self.aliases.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Map each recognizable header in `header_row` to its field.
    ///
    /// Blank headers are skipped; unknown ones are collected in
    /// [`HeaderMap::ignored`]. An empty result is left for the caller to
    /// judge.
    pub fn resolve<S: AsRef<str>>(&self, header_row: &[S]) -> HeaderMap {
        let mut map = HeaderMap::default();
        for (index, raw) in header_row.iter().enumerate() {
            let header = raw.as_ref();
            if header.trim().is_empty() {
                continue;
            }
            match self.lookup(header) {
                Some(field) => map.columns.push(ResolvedColumn {
                    index,
                    header: header.to_string(),
                    field,
                }),
                None => map.ignored.push(header.to_string()),
            }
        }
        map
    }
}

/// Resolve against the built-in table.
pub fn resolve<S: AsRef<str>>(header_row: &[S]) -> HeaderMap {
    HeaderAliasTable::builtin().resolve(header_row)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// Position of the column in the header row.
    pub index: usize,
    /// Header text as it appeared in the export.
    pub header: String,
    pub field: Field,
}

/// The effective header map for one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    pub columns: Vec<ResolvedColumn>,
    pub ignored: Vec<String>,
}

impl HeaderMap {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Field for an original header string.
    pub fn field_for(&self, header: &str) -> Option<Field> {
        self.columns
            .iter()
            .find(|c| c.header == header)
            .map(|c| c.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_alias_resolves_to_its_field() {
        for (alias, field) in DEFAULT_ALIASES {
            let shouty = format!("  {}  ", alias.to_uppercase());
            let map = resolve(&[shouty.as_str()]);
            assert_eq!(map.field_for(&shouty), Some(*field), "alias {alias:?}");
        }
    }

    #[test]
    fn builtin_keys_are_normalized() {
        for (alias, _) in DEFAULT_ALIASES {
            assert_eq!(normalize_header(alias), *alias);
        }
    }

    #[test]
    fn country_resolves_regardless_of_case_and_padding() {
        let map = resolve(&[" Country ", "country", "КРАЇНА"]);
        assert_eq!(map.len(), 3);
        assert!(map.columns.iter().all(|c| c.field == Field::Country));
    }

    #[test]
    fn unknown_and_blank_headers_are_dropped() {
        let map = resolve(&["Campaign Name", "", "Mystery", "   "]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.columns[0].index, 0);
        assert_eq!(map.ignored, vec!["Mystery".to_string()]);
    }

    #[test]
    fn json_overrides_extend_the_builtin_table() {
        let extra = HeaderAliasTable::from_json_str(
            r#"{ "Importe gastado (USD)": "amountSpentUSD", "País": "country" }"#,
        )
        .unwrap();
        let table = HeaderAliasTable::builtin().with_overrides(&extra);
        assert_eq!(table.lookup("importe gastado (usd)"), Some(Field::AmountSpentUsd));
        assert_eq!(table.lookup("PAÍS"), Some(Field::Country));
        assert_eq!(table.lookup("reach"), Some(Field::Reach));
        assert_eq!(table.len(), HeaderAliasTable::builtin().len() + 2);
    }

    #[test]
    fn json_with_unknown_field_id_is_rejected() {
        assert!(HeaderAliasTable::from_json_str(r#"{ "x": "notAField" }"#).is_err());
    }

    #[test]
    fn aliases_for_lists_every_locale() {
        let table = HeaderAliasTable::builtin();
        let spend = table.aliases_for(Field::AmountSpentUsd);
        assert_eq!(
            spend,
            vec!["amount spent", "amount spent (usd)", "витрати", "витрачена сума (usd)"]
        );
    }
}
