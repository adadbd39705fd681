//! Listing generator used by the server when no model backend is plugged in.
//!
//! It reads what it can from the image header and fills a per-style template,
//! then applies the same clean-up a language model's output would get.

pub mod image;
pub mod style;

use std::thread::sleep;
use std::time::Duration;

use adgen::{Payload, Processor};
use anyhow::Context;
use serde_json::{json, Map, Value};

use self::image::ImageInfo;
use self::style::Style;

/// Upper bound on generated text, in characters.
const MAX_AD_CHARS: usize = 600;

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

pub struct ListingProcessor {
    delay: Duration,
}

impl ListingProcessor {
    /// `delay` is added to every call, to mimic a slow inference backend.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for ListingProcessor {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Processor for ListingProcessor {
    fn process(&mut self, payload: Payload) -> anyhow::Result<Value> {
        let info = ImageInfo::sniff(&payload.data).context("could not read image")?;
        let style = Style::from_name(&payload.style);
        tracing::debug!(
            "Composing {} listing for a {} image. Persona: {}",
            style,
            info.format.name(),
            style.instruction()
        );

        if !self.delay.is_zero() {
            sleep(self.delay);
        }

        let ad_text = compose(style, &facts(&info));

        Ok(json!({
            "characteristics": characteristics(&info),
            "ad_text": ad_text,
        }))
    }
}

fn characteristics(info: &ImageInfo) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("format".into(), info.format.name().into());
    map.insert("file_size".into(), info.human_size().into());
    if let Some((width, height)) = info.dimensions {
        map.insert("dimensions".into(), format!("{}x{}", width, height).into());
    }
    map
}

fn facts(info: &ImageInfo) -> String {
    let mut facts = vec![info.format.name().to_string()];
    if let Some((width, height)) = info.dimensions {
        facts.push(format!("{}x{}", width, height));
    }
    facts.push(info.human_size());
    facts.join(", ")
}

fn compose(style: Style, facts: &str) -> String {
    let text = style.template().replace("{facts}", facts);
    let text = match text.char_indices().nth(MAX_AD_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text.as_str(),
    };
    finish_at_sentence(text).to_string()
}

/// Drop a trailing unfinished sentence. Text without any sentence terminator
/// is returned as is.
pub fn finish_at_sentence(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() || text.ends_with(&SENTENCE_TERMINATORS[..]) {
        return text;
    }
    match text.rfind(&SENTENCE_TERMINATORS[..]) {
        Some(end) => &text[..=end],
        None => text,
    }
}
