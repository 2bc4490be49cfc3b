use chrono_tz::Tz;
use minijinja::{context, Environment};
use tourbook_order::ConfirmationResult;

const TEMPLATE_NAME: &str = "confirmation.html";
const BUILTIN_TEMPLATE: &str = include_str!("../templates/confirmation.html");

/// Literal body returned when the confirmation view cannot be rendered.
pub const FALLBACK_BODY: &str = "Reservation accepted";

/// Renders the confirmation page shown after a successful charge.
pub struct ConfirmationView {
    env: Environment<'static>,
    timezone: Tz,
}

impl ConfirmationView {
    /// Uses `confirmation.html` from `templates_dir` when given, the built-in page otherwise.
    pub fn new(templates_dir: Option<&str>, timezone: Tz) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        match templates_dir {
            Some(dir) => env.set_loader(minijinja::path_loader(dir)),
            None => env.add_template(TEMPLATE_NAME, BUILTIN_TEMPLATE)?,
        }
        Ok(Self { env, timezone })
    }

    pub fn builtin(timezone: Tz) -> Result<Self, minijinja::Error> {
        Self::new(None, timezone)
    }

    pub fn render(&self, result: &ConfirmationResult) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let local = result.tour.tour.time.with_timezone(&self.timezone);
        template.render(context! {
            result => result,
            tour_date => local.format("%A, %B %-d, %Y at %-I:%M %p").to_string(),
        })
    }
}
