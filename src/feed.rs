use crate::errors::FeedError;
use crate::models::{PartyResult, RETRIEVAL_TIME_FORMAT, Snapshot};
use chrono::Utc;
use roxmltree::{Document, Node};
use std::collections::BTreeMap;
use tracing::debug;

/// HTTP side of the fetcher. No timeout is configured; reqwest defaults apply.
#[derive(Clone, Default)]
pub struct FeedClient {
    http: reqwest::Client,
}

impl FeedClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn fetch(&self, url: &str) -> Result<Snapshot, FeedError> {
        let http_err = |source: reqwest::Error| FeedError::Http {
            url: url.to_string(),
            source,
        };
        let response = self.http.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(http_err)?;
        debug!(url, bytes = body.len(), "fetched feed");

        parse_snapshot(&body, now_string())
    }
}

pub fn now_string() -> String {
    Utc::now().format(RETRIEVAL_TIME_FORMAT).to_string()
}

pub fn parse_snapshot(xml: &str, retrieval_time: String) -> Result<Snapshot, FeedError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let mut results = BTreeMap::new();
    for party in root.descendants().filter(|n| n.has_tag_name("partido")) {
        let name = text_at(party, &["nombre"])?.trim().to_string();
        results.insert(
            name,
            PartyResult {
                ballots: number_at(party, &["votos_numero"])?,
                perc_ballots: number_at(party, &["votos_porciento"])?,
                seats: number_at(party, &["electos"])?,
            },
        );
    }

    Ok(Snapshot {
        retrieval_time,
        total_seats: number_at(root, &["num_a_elegir"])?,
        perc_counted_votes: number_at(root, &["porciento_escrutado"])?,
        turnout: number_at(root, &["votos", "contabilizados", "porcentaje"])?,
        perc_null_ballots: number_at(root, &["votos", "nulos", "porcentaje"])?,
        perc_blank_ballots: number_at(root, &["votos", "blancos", "porcentaje"])?,
        results,
    })
}

fn text_at<'a>(node: Node<'a, '_>, path: &[&str]) -> Result<&'a str, FeedError> {
    let missing = || FeedError::MissingField(path.join("/"));
    let mut current = node;
    for key in path {
        current = current
            .children()
            .find(|child| child.has_tag_name(*key))
            .ok_or_else(missing)?;
    }
    current.text().ok_or_else(missing)
}

fn number_at(node: Node<'_, '_>, path: &[&str]) -> Result<f64, FeedError> {
    let text = text_at(node, path)?.trim();
    match text.parse::<f64>() {
        // NaN and infinities would be written to the history as null.
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FeedError::InvalidNumber {
            path: path.join("/"),
            value: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_feed(counted: f64) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<escrutinio_sitio>
  <num_a_elegir>136</num_a_elegir>
  <porciento_escrutado>{counted}</porciento_escrutado>
  <votos>
    <contabilizados><cantidad>3000000</cantidad><porcentaje>76.25</porcentaje></contabilizados>
    <nulos><cantidad>9000</cantidad><porcentaje>0.3</porcentaje></nulos>
    <blancos><cantidad>17000</cantidad><porcentaje>0.57</porcentaje></blancos>
  </votos>
  <resultados>
    <partido>
      <nombre> PP </nombre>
      <votos_numero>1620213</votos_numero>
      <votos_porciento>44.73</votos_porciento>
      <electos>65</electos>
    </partido>
    <partido>
      <nombre>Cs</nombre>
      <votos_numero>57000</votos_numero>
      <votos_porciento>3.57</votos_porciento>
      <electos>0</electos>
    </partido>
  </resultados>
</escrutinio_sitio>"#
        )
    }

    #[test]
    fn parses_all_fields() {
        let snapshot = parse_snapshot(&sample_feed(99.5), "2021-05-04 20:00:00".into()).unwrap();
        assert_eq!(snapshot.retrieval_time, "2021-05-04 20:00:00");
        assert_eq!(snapshot.total_seats, 136.0);
        assert_eq!(snapshot.perc_counted_votes, 99.5);
        assert_eq!(snapshot.turnout, 76.25);
        assert_eq!(snapshot.perc_null_ballots, 0.3);
        assert_eq!(snapshot.perc_blank_ballots, 0.57);
        assert_eq!(snapshot.results.len(), 2);
        let pp = &snapshot.results["PP"];
        assert_eq!(pp.ballots, 1620213.0);
        assert_eq!(pp.perc_ballots, 44.73);
        assert_eq!(pp.seats, 65.0);
        assert_eq!(snapshot.seats_of("Cs"), 0.0);
    }

    #[test]
    fn missing_field_is_an_error() {
        let xml = sample_feed(10.0).replace("<num_a_elegir>136</num_a_elegir>", "");
        match parse_snapshot(&xml, now_string()) {
            Err(FeedError::MissingField(path)) => assert_eq!(path, "num_a_elegir"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_party_child_is_an_error() {
        let xml = sample_feed(10.0).replace("<electos>65</electos>", "");
        match parse_snapshot(&xml, now_string()) {
            Err(FeedError::MissingField(path)) => assert_eq!(path, "electos"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_number_is_an_error() {
        let xml = sample_feed(10.0).replace("<porcentaje>0.3</porcentaje>", "<porcentaje>n/a</porcentaje>");
        match parse_snapshot(&xml, now_string()) {
            Err(FeedError::InvalidNumber { path, value }) => {
                assert_eq!(path, "votos/nulos/porcentaje");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for bad in ["NaN", "inf", "-infinity"] {
            let xml = sample_feed(10.0).replace(
                "<porcentaje>76.25</porcentaje>",
                &format!("<porcentaje>{bad}</porcentaje>"),
            );
            match parse_snapshot(&xml, now_string()) {
                Err(FeedError::InvalidNumber { path, value }) => {
                    assert_eq!(path, "votos/contabilizados/porcentaje");
                    assert_eq!(value, bad);
                }
                other => panic!("unexpected result for {bad}: {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            parse_snapshot("<escrutinio_sitio>", now_string()),
            Err(FeedError::Xml(_))
        ));
    }

    #[test]
    fn retrieval_time_uses_fixed_format() {
        let now = now_string();
        assert!(chrono::NaiveDateTime::parse_from_str(&now, RETRIEVAL_TIME_FORMAT).is_ok());
    }
}
