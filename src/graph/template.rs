use crate::graph::{Field, NodeType};

/// Initial shape of a freshly dropped node. The decoder uses the same
/// template to rebuild field lists on import.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTemplate {
    pub title: String,
    pub description: String,
    pub button: Option<String>,
    pub fields: Vec<Field>,
}

impl NodeTemplate {
    fn new(title: &str, description: &str, fields: Vec<Field>) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            button: None,
            fields,
        }
    }

    fn with_button(mut self, label: &str) -> Self {
        self.button = Some(label.to_string());
        self
    }

    pub fn has_field(&self, label: &str) -> bool {
        self.fields.iter().any(|f| f.label == label)
    }
}

pub fn template_for(node_type: &NodeType) -> NodeTemplate {
    match node_type {
        NodeType::PdfLoader => NodeTemplate::new(
            "PDF Loader",
            "Load a PDF file to be used in your project.",
            vec![Field::file("PDF File", None).read_only()],
        )
        .with_button("Select PDF"),
        NodeType::CsvLoader => NodeTemplate::new(
            "CSV Loader",
            "Load a CSV file to be used in your project.",
            vec![Field::file("CSV File", None).read_only()],
        )
        .with_button("Select CSV"),
        NodeType::Parser => NodeTemplate::new(
            "Parser",
            "Parse loaded documents into structured records.",
            vec![
                Field::text("Parser Type", "json").with_placeholder("json, csv, text"),
                Field::array("Keys", Vec::<String>::new()).with_placeholder("comma separated keys"),
            ],
        ),
        NodeType::Prompt => NodeTemplate::new(
            "Prompt",
            "Create a prompt template with dynamic variables.",
            vec![
                Field::text("Template", "").with_placeholder("Answer the question using {context}"),
                Field::array("Input Variables", Vec::<String>::new()).with_placeholder("context, question"),
            ],
        ),
        NodeType::OpenAi => NodeTemplate::new(
            "OpenAI",
            "Generate text with an OpenAI chat model.",
            vec![
                Field::text("Model", "gpt-4o-mini"),
                Field::text("API Key", "").with_placeholder("sk-..."),
                Field::number("Temperature", Some(0.7)),
                Field::number("Max Tokens", None).with_placeholder("256"),
                Field::boolean("Streaming", false),
            ],
        ),
        NodeType::ChatInput => NodeTemplate::new(
            "Chat Input",
            "Get chat messages from the playground.",
            vec![Field::text("Message", "").with_placeholder("Type a message...")],
        ),
        NodeType::ChatOutput => NodeTemplate::new(
            "Chat Output",
            "Display a chat message in the playground.",
            vec![
                Field::text("Sender Name", "AI"),
                Field::boolean("Store Messages", true),
            ],
        ),
        NodeType::Other(tag) => NodeTemplate::new(tag, "", Vec::new()),
    }
}
