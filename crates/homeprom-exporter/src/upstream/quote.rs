//! HTML quote scraper (e.g. the MSCI World last price on a quote page).

use async_trait::async_trait;
use scraper::{Html, Selector};

use homeprom_core::error::{HomepromError, Result};
use homeprom_core::{Reading, Unit};

use super::{get_body, Upstream};

const SOURCE: &str = "quote";

pub struct QuoteClient {
    http: reqwest::Client,
    url: String,
    selector: Selector,
}

impl QuoteClient {
    pub fn new(http: reqwest::Client, url: &str, selector: &str) -> Result<Self> {
        let selector = Selector::parse(selector)
            .map_err(|e| HomepromError::Config(format!("invalid quote selector {selector:?}: {e:?}")))?;
        Ok(Self {
            http,
            url: url.to_string(),
            selector,
        })
    }
}

#[async_trait]
impl Upstream for QuoteClient {
    type Reading = Reading;

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self) -> Result<Reading> {
        let body = get_body(SOURCE, self.http.get(&self.url)).await?;
        let html = std::str::from_utf8(&body).map_err(|e| HomepromError::decode(SOURCE, e.to_string()))?;
        let price = parse_quote(html, &self.selector)?;
        Ok(Reading::new(self.url.clone(), "last_price", price, Unit::Native))
    }
}

/// Extract the first element matching `selector` and parse it as a price.
/// Thousands separators and surrounding whitespace are ignored.
pub fn parse_quote(html: &str, selector: &Selector) -> Result<f64> {
    let doc = Html::parse_document(html);
    let el = doc
        .select(selector)
        .next()
        .ok_or_else(|| HomepromError::decode(SOURCE, "no element matches the quote selector"))?;
    let text: String = el.text().collect();
    let cleaned: String = text.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    cleaned
        .parse::<f64>()
        .map_err(|e| HomepromError::decode(SOURCE, format!("quote {text:?} is not a number: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sel() -> Selector {
        Selector::parse("span.QuoteStrip-lastPrice").unwrap()
    }

    #[test]
    fn parses_price_with_thousands_separator() {
        let html = r#"<html><body><div><span class="QuoteStrip-lastPrice"> 3,512.25 </span></div></body></html>"#;
        assert_eq!(parse_quote(html, &sel()).unwrap(), 3512.25);
    }

    #[test]
    fn first_match_wins() {
        let html = r#"<span class="QuoteStrip-lastPrice">10</span><span class="QuoteStrip-lastPrice">20</span>"#;
        assert_eq!(parse_quote(html, &sel()).unwrap(), 10.0);
    }

    #[test]
    fn missing_or_garbled_price_is_decode_error() {
        assert!(parse_quote("<span class=\"other\">1</span>", &sel()).is_err());
        let err = parse_quote(r#"<span class="QuoteStrip-lastPrice">n/a</span>"#, &sel()).unwrap_err();
        assert_eq!(err.kind(), homeprom_core::ErrorKind::Decode);
    }
}
