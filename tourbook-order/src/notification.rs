use chrono::DateTime;
use chrono_tz::Tz;
use tourbook_core::notify::{Mailbox, Message};
use tourbook_core::Team;
use crate::models::ConfirmationResult;
use crate::warnings::WarningKind;

pub const NO_CONF_SENT_PREFIX: &str = "NO CONF SENT | ";

/// Sender and operator mailboxes used for every confirmation.
#[derive(Debug, Clone)]
pub struct MailPolicy {
    pub from: Mailbox,
    pub operator: Mailbox,
    /// Copy the operator on customer confirmations.
    pub bcc_operator: bool,
    /// Operator timezone; tour times are shown as local wall-clock time.
    pub timezone: Tz,
}

impl MailPolicy {
    pub fn local_time(&self, result: &ConfirmationResult) -> DateTime<Tz> {
        result.tour.tour.time.with_timezone(&self.timezone)
    }
}

pub fn customer_subject(result: &ConfirmationResult, policy: &MailPolicy) -> String {
    format!(
        "{} Tour {} Bike Tour Confirmation",
        policy.local_time(result).format("%B %-d"),
        result.tour.tour.code
    )
}

fn join_lines(lines: Vec<String>) -> String {
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

/// Confirmation email addressed to the customer.
pub fn customer_message(result: &ConfirmationResult, policy: &MailPolicy) -> Message {
    let tour = &result.tour.tour;
    let when = policy.local_time(result);

    let greeting = if result.contact.name.is_empty() {
        "Hello,".to_string()
    } else {
        format!("Hello {},", result.contact.name)
    };
    let mut lines = vec![
        greeting,
        String::new(),
        "Thank you for your reservation. Your booking is confirmed.".to_string(),
        String::new(),
        format!("Tour:    {}", tour.code),
        format!("When:    {}", when.format("%A, %B %-d, %Y at %-I:%M %p")),
        format!("Riders:  {}", result.rider_count),
        format!("Total:   {}", result.display_total),
        format!("Order:   {}", result.order_id),
    ];

    if !result.riders.is_empty() {
        lines.push(String::new());
        lines.push("Riders on file:".to_string());
        for (i, rider) in result.riders.iter().enumerate() {
            let height = rider
                .height
                .map(|h| format!("{}\"", h))
                .unwrap_or_else(|| "not provided".to_string());
            lines.push(format!("  {}. {} {}", i + 1, rider.gender.code(), height));
        }
    }

    if !result.contact.hotel.is_empty() {
        lines.push(String::new());
        lines.push(format!("Hotel: {}", result.contact.hotel));
    }

    lines.push(String::new());
    lines.push("Please arrive 15 minutes before the tour starts.".to_string());

    Message {
        from: policy.from.clone(),
        to: Mailbox::new(
            result.contact.name.clone(),
            result.contact.email.expose().clone(),
        ),
        bcc: policy.bcc_operator.then(|| policy.operator.clone()),
        subject: customer_subject(result, policy),
        body: join_lines(lines),
    }
}

/// Operator summary, sent whether or not the customer was emailed.
pub fn operator_message(
    result: &ConfirmationResult,
    teams: &[Team],
    customer_notified: bool,
    policy: &MailPolicy,
) -> Message {
    let tour = &result.tour;
    let when = policy.local_time(result);

    let mut lines = vec![
        format!("Order:      {}", result.order_id),
        format!("Receipt:    {}", result.receipt_id),
        format!("Tour:       {} #{} {}", tour.tour.code, tour.id(), when.format("%Y/%m/%d %H:%M %Z")),
        format!(
            "Riders:     {} booked, {} spots before, {} after",
            result.rider_count,
            tour.spots_remaining,
            i64::from(tour.spots_remaining) - i64::from(result.rider_count)
        ),
    ];
    if tour.tour.riders_require_height {
        lines.push(format!(
            "Submitted:  {} of {} rider entries",
            result.riders_submitted, result.rider_count
        ));
    }
    lines.extend([
        format!("Total:      {}", result.display_total),
        String::new(),
        format!("Name:       {}", result.contact.name),
        format!("Email:      {}", result.contact.email.expose()),
        format!("Mobile:     {}", result.contact.mobile),
        format!("Hotel:      {}", result.contact.hotel),
        format!("Note:       {}", result.contact.misc),
        String::new(),
    ]);

    if customer_notified {
        lines.push("Customer email: sent".to_string());
    } else {
        lines.push(format!("Customer email: SKIPPED ({})", result.email_skipped));
    }
    if result.warnings.contains(WarningKind::UnknownHeights) {
        lines.push("Heights: UNKNOWN, check sizing with the customer".to_string());
    }

    if teams.is_empty() {
        lines.push("Teams: none assigned".to_string());
    } else {
        for team in teams {
            lines.push(format!("Team: guide {} / sweep {}", team.guide, team.sweep));
        }
    }

    if !result.warnings.is_empty() {
        lines.push(String::new());
        lines.push(format!("Warnings: {}", result.warnings));
    }

    let mut subject = format!(
        "{} Tour {} booking: {} riders",
        when.format("%B %-d"),
        tour.tour.code,
        result.rider_count
    );
    if !customer_notified {
        subject.insert_str(0, NO_CONF_SENT_PREFIX);
    }

    Message {
        from: policy.from.clone(),
        to: policy.operator.clone(),
        bcc: None,
        subject,
        body: join_lines(lines),
    }
}
