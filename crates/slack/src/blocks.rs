use serde::Serialize;

pub const KUDOS_HEADER_TEXT: &str = "🎉 Novo Elogio! 🎉";
pub const KUDOS_FOOTER_TEXT: &str = "✨ _Continue fazendo a diferença!_ ✨";
pub const REMINDER_FALLBACK_TEXT: &str = "Lembrete semanal: envie um elogio para seus colegas!";
pub const REMINDER_ACTIONS_BLOCK_ID: &str = "reminder_actions";
pub const OPEN_KUDOS_MODAL_ACTION_ID: &str = "open_kudos_modal";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        emoji: Option<bool>,
    },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into(), emoji: None }
    }

    pub fn plain_emoji(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into(), emoji: Some(true) }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text, .. } | Self::Mrkdwn { text } => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonElement {
    #[serde(rename = "type")]
    element_type: &'static str,
    pub action_id: String,
    pub text: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            element_type: "button",
            action_id: action_id.into(),
            text: TextObject::plain(label),
            style: None,
            value: None,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        block_id: String,
        text: TextObject,
    },
    Section {
        block_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<TextObject>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<TextObject>,
    },
    Divider {
        block_id: String,
    },
    Actions {
        block_id: String,
        elements: Vec<ButtonElement>,
    },
    Context {
        block_id: String,
        elements: Vec<TextObject>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn header(mut self, block_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.blocks
            .push(Block::Header { block_id: block_id.into(), text: TextObject::plain_emoji(text) });
        self
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        let mut builder = SectionBuilder::default();
        build(&mut builder);
        let (text, fields) = builder.build();
        self.blocks.push(Block::Section { block_id: block_id.into(), text, fields });
        self
    }

    pub fn divider(mut self, block_id: impl Into<String>) -> Self {
        self.blocks.push(Block::Divider { block_id: block_id.into() });
        self
    }

    pub fn actions<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Actions { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks.push(Block::Context { block_id: block_id.into(), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
    fields: Vec<TextObject>,
}

impl SectionBuilder {
    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    pub fn field(&mut self, text: impl Into<String>) -> &mut Self {
        self.fields.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> (Option<TextObject>, Vec<TextObject>) {
        let text = match (self.text, self.fields.is_empty()) {
            (Some(text), _) => Some(text),
            (None, true) => Some(TextObject::plain("")),
            (None, false) => None,
        };
        (text, self.fields)
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    elements: Vec<ButtonElement>,
}

impl ActionsBuilder {
    pub fn button(&mut self, button: ButtonElement) -> &mut Self {
        self.elements.push(button);
        self
    }

    fn build(self) -> Vec<ButtonElement> {
        self.elements
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

/// A kudos post: who sent it, who receives it and under which category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KudosCard {
    pub sender_id: String,
    /// Submission order, duplicates kept.
    pub recipient_ids: Vec<String>,
    pub glyph: String,
    pub label: String,
    pub message: String,
}

impl KudosCard {
    /// Always exactly seven blocks, whatever the inputs.
    pub fn blocks(&self) -> Vec<Block> {
        self.render().blocks
    }

    /// One-line summary for notifications; leaves out the message body.
    pub fn fallback_text(&self) -> String {
        format!(
            "<@{}> elogiou {}: {} {}",
            self.sender_id,
            format_mentions(&self.recipient_ids),
            self.glyph,
            self.label
        )
    }

    pub fn render(&self) -> MessageTemplate {
        MessageBuilder::new(self.fallback_text())
            .header("kudos.header.v1", KUDOS_HEADER_TEXT)
            .section("kudos.people.v1", |section| {
                section
                    .field(format!("*De:*\n<@{}>", self.sender_id))
                    .field(format!("*Para:*\n{}", format_mentions(&self.recipient_ids)));
            })
            .divider("kudos.divider.top.v1")
            .section("kudos.category.v1", |section| {
                section.mrkdwn(format!("{} *{}*", self.glyph, self.label));
            })
            .section("kudos.message.v1", |section| {
                section.mrkdwn(format_as_quote(&self.message));
            })
            .divider("kudos.divider.bottom.v1")
            .context("kudos.footer.v1", |context| {
                context.mrkdwn(KUDOS_FOOTER_TEXT);
            })
            .build()
    }
}

/// `["U1", "U2"]` -> `"<@U1>, <@U2>"`.
pub fn format_mentions(user_ids: &[String]) -> String {
    user_ids.iter().map(|user_id| format!("<@{user_id}>")).collect::<Vec<_>>().join(", ")
}

/// Prefixes every line with `"> "`, blank lines included. An empty message
/// stays empty.
pub fn format_as_quote(message: &str) -> String {
    if message.is_empty() {
        return String::new();
    }
    message.split('\n').map(|line| format!("> {line}")).collect::<Vec<_>>().join("\n")
}

pub fn reminder_message() -> MessageTemplate {
    MessageBuilder::new(REMINDER_FALLBACK_TEXT)
        .header("reminder_header", "👋 Lembrete Semanal de Kudos")
        .section("reminder_body", |section| {
            section.mrkdwn(
                "Esta semana você reconheceu algum colega pelo trabalho excepcional?\n\nUse `/elogie` para enviar um elogio e valorizar sua equipe!",
            );
        })
        .actions(REMINDER_ACTIONS_BLOCK_ID, |actions| {
            actions.button(
                ButtonElement::new(OPEN_KUDOS_MODAL_ACTION_ID, "📝 Enviar Elogio Agora")
                    .style(ButtonStyle::Primary)
                    .value("open_modal"),
            );
        })
        .divider("reminder_divider")
        .context("reminder_context", |context| {
            context.mrkdwn("💡 *Dica:* Elogios específicos e detalhados têm mais impacto!");
        })
        .build()
}
