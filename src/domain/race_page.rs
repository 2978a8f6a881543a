use scraper::{Html, Selector};

/// Marker the race list page puts on a venue that is racing today.
///
/// Only real elements count: a class name that shows up inside some other
/// attribute value, or in plain text, does not match.
#[derive(Debug, Clone)]
pub struct HoldingMarker {
    selector: Selector,
}

impl HoldingMarker {
    pub fn parse(css: &str) -> anyhow::Result<Self> {
        let selector = Selector::parse(css)
            .map_err(|e| anyhow::anyhow!("Invalid marker selector {:?}: {}", css, e))?;

        Ok(HoldingMarker { selector })
    }

    pub fn is_held_today(&self, page_source: &str) -> bool {
        let html_document = Html::parse_document(page_source);
        let held = html_document.select(&self.selector).next().is_some();

        log::debug!("Holding marker found: {}", held);

        held
    }
}
