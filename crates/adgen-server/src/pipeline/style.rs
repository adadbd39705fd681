use std::fmt;

/// Tone of the generated listing. Unknown names fall back to [`Style::Brief`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Brief,
    Professional,
    Social,
}

impl Style {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "brief" => Style::Brief,
            "professional" => Style::Professional,
            "social" => Style::Social,
            other => {
                tracing::debug!("Unknown style `{}`, using brief", other);
                Style::Brief
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Style::Brief => "brief",
            Style::Professional => "professional",
            Style::Social => "social",
        }
    }

    /// Persona the text is written in.
    pub fn instruction(&self) -> &'static str {
        match self {
            Style::Brief => "A copywriter writing short, vivid listings that sell (4-5 sentences).",
            Style::Professional => {
                "A realtor writing a detailed, structured listing for a property site, \
                 in a professional and businesslike tone."
            }
            Style::Social => {
                "A social media manager writing an engaging post with emoji, a few \
                 relevant hashtags and an informal voice."
            }
        }
    }

    pub(crate) fn template(&self) -> &'static str {
        match self {
            Style::Brief => {
                "A home that speaks for itself. Bright rooms, a welcoming feel and a layout \
                 made for everyday life. The photo says it all: {facts}. \
                 Book a viewing before it is gone!"
            }
            Style::Professional => {
                "We are pleased to present a well-maintained residential property. \
                 The listing photograph ({facts}) shows the exterior in good condition. \
                 The property offers practical living space, a clear layout and easy access \
                 to local amenities. Please contact our office to arrange a private viewing."
            }
            Style::Social => {
                "\u{2728} Just listed! \u{1F3E1} Fall in love with this place at first sight \
                 ({facts}). Tag someone who needs a new home! #NewListing #HomeGoals \
                 Send us a message to book a visit!"
            }
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
