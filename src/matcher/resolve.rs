use tracing::debug;

use super::types::DescriptorSpec;
use crate::config::MatcherConfig;
use crate::error::{Error, Result};
use crate::table::{utils::contains_ignore_case, ColumnKind, RawTable};

/// Resolve the descriptor columns to search, as column indices.
///
/// Explicit names must all exist. Otherwise every column whose name
/// contains a descriptor token is used; failing that, the first text column
/// that mentions the entity somewhere.
pub fn resolve_descriptors(
    table: &RawTable,
    entity: &str,
    spec: &DescriptorSpec,
    config: &MatcherConfig,
) -> Result<Vec<usize>> {
    if let DescriptorSpec::Columns(names) = spec {
        return names
            .iter()
            .map(|name| {
                table
                    .column_index(name.trim())
                    .ok_or_else(|| Error::MissingColumn {
                        column: name.clone(),
                    })
            })
            .collect();
    }

    let tokens: Vec<String> = config
        .descriptor_tokens
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    let by_name: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            let name = c.name.to_lowercase();
            tokens.iter().any(|t| name.contains(t.as_str()))
        })
        .map(|(i, _)| i)
        .collect();
    if !by_name.is_empty() {
        debug!(columns = ?by_name, "descriptor columns by name token");
        return Ok(by_name);
    }

    let needle = entity.trim().to_lowercase();
    let by_content = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.kind == ColumnKind::Text)
        .map(|(i, _)| i)
        .find(|&i| table.column_values(i).any(|v| contains_ignore_case(v, &needle)));

    match by_content {
        Some(i) => {
            debug!(column = i, "descriptor column by content");
            Ok(vec![i])
        }
        None => Err(Error::NoDescriptorColumn {
            entity: entity.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderConfig;
    use crate::table::{load, TableSource};

    fn table(csv: &str) -> RawTable {
        load(&TableSource::bytes("CAFE.csv", csv), &LoaderConfig::default()).unwrap()
    }

    #[test]
    fn test_tokens_pick_all_matching_columns() {
        let t = table("cafe,Menu_1,menu_2,rating\nBean,latte,mocha,4\n");
        let cols =
            resolve_descriptors(&t, "latte", &DescriptorSpec::Infer, &MatcherConfig::default())
                .unwrap();
        assert_eq!(cols, vec![1, 2]);
    }

    #[test]
    fn test_korean_token() {
        let t = table("디저트,카페1,위치1\n라떼,A카페,서울\n");
        let cols =
            resolve_descriptors(&t, "라떼", &DescriptorSpec::Infer, &MatcherConfig::default())
                .unwrap();
        assert_eq!(cols, vec![0]);
    }

    #[test]
    fn test_content_fallback() {
        let t = table("cafe,sells,rating\nBean,Iced Latte,4\nLeaf,Tea,3\n");
        let cols =
            resolve_descriptors(&t, "LATTE", &DescriptorSpec::Infer, &MatcherConfig::default())
                .unwrap();
        assert_eq!(cols, vec![1]);
    }

    #[test]
    fn test_no_candidate() {
        let t = table("cafe,sells\nBean,Tea\n");
        let err =
            resolve_descriptors(&t, "latte", &DescriptorSpec::Infer, &MatcherConfig::default())
                .unwrap_err();
        assert!(matches!(err, Error::NoDescriptorColumn { .. }));
    }

    #[test]
    fn test_explicit_columns_must_exist() {
        let t = table("cafe,sells\nBean,Tea\n");
        let spec = DescriptorSpec::Columns(vec!["sells".into(), "menu".into()]);
        let err = resolve_descriptors(&t, "tea", &spec, &MatcherConfig::default()).unwrap_err();
        match err {
            Error::MissingColumn { column } => assert_eq!(column, "menu"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
