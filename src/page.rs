use common::RenderPayload;
use compute::FEATURE_COUNT;
use minijinja::{Environment, context};
use serde::Serialize;

const INDEX_TEMPLATE: &str = "index.html";
const ERROR_TEMPLATE: &str = "error.html";

/// One numbered input of the prediction form.
#[derive(Debug, Serialize)]
struct FormField {
    name: String,
    label: String,
    value: String,
}

/// HTML pages for the dashboard, backed by the templates in `templates/`.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;
        env.add_template(ERROR_TEMPLATE, include_str!("../templates/error.html"))?;
        Ok(Self { env })
    }

    /// Renders the dashboard. `submitted` refills the form so a rejected
    /// submission can be corrected in place.
    pub fn dashboard(
        &self,
        payload: &RenderPayload,
        submitted: &[String],
    ) -> Result<String, minijinja::Error> {
        let inputs: Vec<FormField> = (0..FEATURE_COUNT)
            .map(|i| FormField {
                name: format!("input_{}", i + 1),
                label: format!("Feature {}", i + 1),
                value: submitted.get(i).cloned().unwrap_or_default(),
            })
            .collect();

        self.env.get_template(INDEX_TEMPLATE)?.render(context! {
            prediction => payload.prediction.map(|p| format!("{:.2}", p)),
            comparison_chart => payload.comparison_chart,
            variable_chart => payload.variable_chart,
            variables => payload.variables,
            selected_variable => payload.selected_variable,
            notice => payload.notice,
            inputs => inputs,
        })
    }

    pub fn error(&self, message: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template(ERROR_TEMPLATE)?
            .render(context! { message => message })
    }
}
