//! Renders newly available locations as Slack Block Kit JSON.
//!
//! The message is a header section, then a location section, a "Register
//! Now" button and a divider for each location (Hy-Vee first, then
//! VaccineSpotter), and a footer with the local posting time. A plain-text
//! mirror is built alongside for clients that cannot show blocks.

use serde::Serialize;

use crate::providers::{Location, LocationDetails};

pub const HEADER_LINE: &str = ":alert: <!here> *Vaccines Available* :alert:";
const HEADER_BODY: &str =
    "The following locations have COVID-19 vaccination appointments :covid-19: :syringe: available now!";
const BUTTON_LABEL: &str = "Register Now";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    Mrkdwn { text: String },
    PlainText { text: String, emoji: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button { text: Text, style: String, url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: Text },
    Actions { elements: Vec<Element> },
    Divider,
}

impl Block {
    fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: Text::Mrkdwn { text: text.into() },
        }
    }

    fn register_button(url: &str) -> Self {
        Block::Actions {
            elements: vec![Element::Button {
                text: Text::PlainText {
                    text: BUTTON_LABEL.to_string(),
                    emoji: true,
                },
                style: "primary".to_string(),
                url: url.to_string(),
            }],
        }
    }
}

/// A composed notification: structured blocks plus the text fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackMessage {
    pub blocks: Vec<Block>,
    pub text: String,
}

impl LocationDetails {
    /// Slack mrkdwn for one location.
    pub fn mrkdwn(&self) -> String {
        match self {
            LocationDetails::HyVee {
                name,
                address,
                city,
                state,
                zip,
            } => format!("*{}*\n{}\n{}, {} {}", name, address, city, state, zip),
            LocationDetails::Cvs { city, state } => format!("*CVS*\n{}, {}", city, state),
            LocationDetails::Pharmacy {
                name,
                brand,
                address,
                city,
                state,
                zip,
            } => format!("*{} {}*\n{}\n{}, {} {}", name, brand, address, city, state, zip),
        }
    }
}

struct Composer {
    blocks: Vec<Block>,
    text: String,
}

impl Composer {
    fn new() -> Self {
        Self {
            blocks: vec![Block::section(format!("{}\n\n{}", HEADER_LINE, HEADER_BODY))],
            text: HEADER_LINE.to_string(),
        }
    }

    fn location(&mut self, location: &Location) {
        let body = location.details.mrkdwn();
        self.text.push_str("\n\n");
        self.text.push_str(&body);
        self.blocks.push(Block::section(body));

        self.text.push('\n');
        self.text.push_str(&location.registration_url);
        self.blocks.push(Block::register_button(&location.registration_url));

        self.blocks.push(Block::Divider);
    }

    fn finish(mut self, posted_at: &str) -> SlackMessage {
        let footer = format!("_Posted {}_", posted_at);
        self.text.push_str("\n\n");
        self.text.push_str(&footer);
        self.blocks.push(Block::section(footer));
        SlackMessage {
            blocks: self.blocks,
            text: self.text,
        }
    }
}

/// Build the notification for one search area. `posted_at` is the already
/// localized footer timestamp.
pub fn compose(hyvee: &[Location], spotter: &[Location], posted_at: &str) -> SlackMessage {
    let mut composer = Composer::new();
    for location in hyvee.iter().chain(spotter) {
        composer.location(location);
    }
    composer.finish(posted_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::hyvee::HYVEE_REGISTRATION_URL;
    use crate::providers::ProviderFamily;
    use serde_json::json;

    fn hyvee_location() -> Location {
        Location {
            family: ProviderFamily::HyVee,
            id: "h1".to_string(),
            details: LocationDetails::HyVee {
                name: "Dodge Street".to_string(),
                address: "7910 Cass St".to_string(),
                city: "Omaha".to_string(),
                state: "NE".to_string(),
                zip: "68114".to_string(),
            },
            is_available: true,
            registration_url: HYVEE_REGISTRATION_URL.to_string(),
        }
    }

    fn cvs_location() -> Location {
        Location {
            family: ProviderFamily::Spotter,
            id: "s1".to_string(),
            details: LocationDetails::Cvs {
                city: "OMAHA".to_string(),
                state: "NE".to_string(),
            },
            is_available: true,
            registration_url: "https://www.cvs.com/vaccine".to_string(),
        }
    }

    fn walgreens_location() -> Location {
        Location {
            family: ProviderFamily::Spotter,
            id: "s2".to_string(),
            details: LocationDetails::Pharmacy {
                name: "Walgreens 4521".to_string(),
                brand: "Walgreens".to_string(),
                address: "7202 Dodge St".to_string(),
                city: "Omaha".to_string(),
                state: "NE".to_string(),
                zip: "68114".to_string(),
            },
            is_available: true,
            registration_url: "https://www.walgreens.com/vaccine".to_string(),
        }
    }

    #[test]
    fn each_location_gets_section_button_and_divider() {
        let message = compose(
            &[hyvee_location()],
            &[cvs_location(), walgreens_location()],
            "Mar 01, 2021 at 12:00:00 PM CST",
        );

        // header + 3 * (section, actions, divider) + footer
        assert_eq!(message.blocks.len(), 11);
        assert!(matches!(message.blocks[0], Block::Section { .. }));
        assert!(matches!(message.blocks[2], Block::Actions { .. }));
        assert_eq!(message.blocks[3], Block::Divider);
        assert_eq!(
            message.blocks[10],
            Block::section("_Posted Mar 01, 2021 at 12:00:00 PM CST_")
        );
    }

    #[test]
    fn provider_variants_render_differently() {
        assert_eq!(
            hyvee_location().details.mrkdwn(),
            "*Dodge Street*\n7910 Cass St\nOmaha, NE 68114"
        );
        assert_eq!(cvs_location().details.mrkdwn(), "*CVS*\nOMAHA, NE");
        assert_eq!(
            walgreens_location().details.mrkdwn(),
            "*Walgreens 4521 Walgreens*\n7202 Dodge St\nOmaha, NE 68114"
        );
    }

    #[test]
    fn text_fallback_mirrors_blocks() {
        let message = compose(&[hyvee_location()], &[cvs_location()], "now");

        let expected = format!(
            "{}\n\n*Dodge Street*\n7910 Cass St\nOmaha, NE 68114\n{}\n\n*CVS*\nOMAHA, NE\nhttps://www.cvs.com/vaccine\n\n_Posted now_",
            HEADER_LINE, HYVEE_REGISTRATION_URL
        );
        assert_eq!(message.text, expected);
    }

    #[test]
    fn blocks_serialize_to_slack_block_kit() {
        let message = compose(&[], &[cvs_location()], "now");
        let value = serde_json::to_value(&message.blocks).unwrap();

        assert_eq!(value[0]["type"], "section");
        assert_eq!(value[0]["text"]["type"], "mrkdwn");
        assert_eq!(
            value[2],
            json!({
                "type": "actions",
                "elements": [{
                    "type": "button",
                    "text": {"type": "plain_text", "text": "Register Now", "emoji": true},
                    "style": "primary",
                    "url": "https://www.cvs.com/vaccine"
                }]
            })
        );
        assert_eq!(value[3], json!({"type": "divider"}));
    }

    #[test]
    fn compose_is_deterministic() {
        let a = compose(&[hyvee_location()], &[walgreens_location()], "t");
        let b = compose(&[hyvee_location()], &[walgreens_location()], "t");
        assert_eq!(a, b);
    }
}
