//! Server-rendered HTML for the cookie-session surface.
//!
//! Every user-supplied value goes through [`escape`] before it is
//! interpolated.

use crate::models::report::{PeriodTotal, WorkReport, WorkStats};
use crate::models::work_log::{MAX_HOURS_PER_ENTRY, WorkLog, WorkLogForm};
use rocket::http::Status;
use rocket::response::content::RawHtml;

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Filter values as typed by the user, echoed back into forms and links.
#[derive(Debug, Clone, Default)]
pub struct FilterValues {
    pub date_from: String,
    pub date_to: String,
    pub search: String,
}

impl FilterValues {
    pub fn query_string(&self) -> String {
        let pairs: Vec<String> = [("date_from", &self.date_from), ("date_to", &self.date_to), ("search", &self.search)]
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();

        if pairs.is_empty() { String::new() } else { format!("?{}", pairs.join("&")) }
    }
}

fn base_style() -> &'static str {
    r#"
    * { box-sizing: border-box; }
    body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f4f5fb; color: #222; }
    nav { background: #4a5bd4; padding: 12px 24px; display: flex; gap: 16px; align-items: center; }
    nav a { color: #fff; text-decoration: none; font-size: 14px; }
    nav .user { margin-left: auto; color: #dfe3ff; font-size: 14px; }
    main { max-width: 960px; margin: 32px auto; padding: 0 16px; }
    .card { background: #fff; border-radius: 12px; padding: 24px; box-shadow: 0 2px 12px rgba(0,0,0,.06); margin-bottom: 24px; }
    .narrow { max-width: 420px; margin: 48px auto; }
    h1 { margin-top: 0; font-size: 24px; }
    h2 { font-size: 18px; }
    label { display: block; font-size: 14px; margin: 12px 0 4px; color: #555; }
    input, textarea { width: 100%; padding: 10px; border: 1px solid #ccd; border-radius: 8px; font-size: 14px; }
    textarea { min-height: 80px; }
    button, .btn { display: inline-block; margin-top: 16px; padding: 10px 18px; border: 0; border-radius: 8px; background: #4a5bd4; color: #fff; font-size: 14px; cursor: pointer; text-decoration: none; }
    .btn-secondary { background: #6c757d; }
    .btn-danger { background: #d9534f; margin-top: 0; padding: 6px 12px; }
    .error { background: #fdecea; color: #a12622; padding: 10px 14px; border-radius: 8px; margin-bottom: 12px; }
    .success { background: #e7f6ec; color: #1e6b3a; padding: 10px 14px; border-radius: 8px; margin-bottom: 12px; }
    .notice { background: #fff6e0; color: #7a5a00; padding: 10px 14px; border-radius: 8px; margin-bottom: 12px; }
    table { width: 100%; border-collapse: collapse; font-size: 14px; }
    th, td { text-align: left; padding: 8px; border-bottom: 1px solid #eee; vertical-align: top; }
    td.num, th.num { text-align: right; }
    .filters { display: flex; gap: 12px; flex-wrap: wrap; align-items: flex-end; }
    .filters > div { flex: 1; min-width: 160px; }
    .stats { display: flex; gap: 16px; }
    .stat { flex: 1; background: #f0f2ff; border-radius: 10px; padding: 16px; text-align: center; }
    .stat .value { font-size: 28px; font-weight: 600; color: #4a5bd4; }
    .bar { background: #4a5bd4; height: 12px; border-radius: 6px; }
    .inline { display: inline; }
    "#
}

fn layout(title: &str, username: Option<&str>, body: &str) -> RawHtml<String> {
    let nav = match username {
        Some(name) => format!(
            r#"<nav>
  <a href="/dashboard">Dashboard</a>
  <a href="/worklog/new">New entry</a>
  <a href="/worklog/list">Entries</a>
  <a href="/reports">Reports</a>
  <span class="user">{name}</span>
  <a href="/logout">Log out</a>
</nav>"#,
            name = escape(name),
        ),
        None => r#"<nav><a href="/">Work hours</a><span class="user"></span><a href="/login">Log in</a><a href="/register">Register</a></nav>"#.to_string(),
    };

    RawHtml(format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title} - Work hours</title>
<style>{style}</style>
</head><body>
{nav}
<main>
{body}
</main>
</body></html>"#,
        title = escape(title),
        style = base_style(),
    ))
}

fn message_block(class: &str, message: Option<&str>) -> String {
    message.map(|m| format!(r#"<div class="{class}">{}</div>"#, escape(m))).unwrap_or_default()
}

fn hours(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn home_page() -> RawHtml<String> {
    layout(
        "Welcome",
        None,
        r#"<div class="card narrow">
  <h1>Work hours tracker</h1>
  <p>Record what you worked on each day, filter and export your entries, and see daily, weekly and monthly totals.</p>
  <a class="btn" href="/login">Log in</a>
  <a class="btn btn-secondary" href="/register">Create an account</a>
</div>"#,
    )
}

pub fn login_page(error: Option<&str>, timed_out: bool, username: &str) -> RawHtml<String> {
    let notice = if timed_out {
        message_block("notice", Some("Your session expired due to inactivity. Please log in again."))
    } else {
        String::new()
    };

    layout(
        "Log in",
        None,
        &format!(
            r#"<div class="card narrow">
  <h1>Log in</h1>
  {notice}
  {error}
  <form method="POST" action="/login">
    <label for="username">Username</label>
    <input id="username" type="text" name="username" value="{username}" required autocomplete="username">
    <label for="password">Password</label>
    <input id="password" type="password" name="password" required autocomplete="current-password">
    <button type="submit">Log in</button>
  </form>
  <p>No account yet? <a href="/register">Register</a></p>
</div>"#,
            error = message_block("error", error),
            username = escape(username),
        ),
    )
}

pub fn register_page(error: Option<&str>, username: &str) -> RawHtml<String> {
    layout(
        "Register",
        None,
        &format!(
            r#"<div class="card narrow">
  <h1>Create an account</h1>
  {error}
  <form method="POST" action="/register">
    <label for="username">Username</label>
    <input id="username" type="text" name="username" value="{username}" required minlength="3" maxlength="64" autocomplete="username">
    <label for="password">Password</label>
    <input id="password" type="password" name="password" required minlength="6" autocomplete="new-password">
    <label for="password_confirm">Confirm password</label>
    <input id="password_confirm" type="password" name="password_confirm" required minlength="6" autocomplete="new-password">
    <button type="submit">Register</button>
  </form>
  <p>Already registered? <a href="/login">Log in</a></p>
</div>"#,
            error = message_block("error", error),
            username = escape(username),
        ),
    )
}

fn stats_block(stats: &WorkStats) -> String {
    format!(
        r#"<div class="stats">
  <div class="stat"><div class="value">{total}</div>Total hours</div>
  <div class="stat"><div class="value">{count}</div>Entries</div>
  <div class="stat"><div class="value">{avg}</div>Average per entry</div>
</div>"#,
        total = hours(stats.total_hours),
        count = stats.days_count,
        avg = hours(stats.avg_hours),
    )
}

pub fn dashboard_page(username: &str, stats: &WorkStats) -> RawHtml<String> {
    layout(
        "Dashboard",
        Some(username),
        &format!(
            r#"<div class="card">
  <h1>Hello, {name}</h1>
  {stats}
  <a class="btn" href="/worklog/new">Add an entry</a>
  <a class="btn btn-secondary" href="/worklog/list">View entries</a>
  <a class="btn btn-secondary" href="/reports">Reports</a>
</div>"#,
            name = escape(username),
            stats = stats_block(stats),
        ),
    )
}

pub struct EntryFormView<'a> {
    pub title: &'a str,
    pub action: String,
    pub form: &'a WorkLogForm,
    pub error: Option<&'a str>,
    pub success: Option<&'a str>,
}

pub fn entry_form_page(username: &str, view: EntryFormView<'_>) -> RawHtml<String> {
    layout(
        view.title,
        Some(username),
        &format!(
            r#"<div class="card narrow">
  <h1>{title}</h1>
  {success}
  {error}
  <form method="POST" action="{action}">
    <label for="date">Date</label>
    <input id="date" type="date" name="date" value="{date}" required>
    <label for="description">Description</label>
    <textarea id="description" name="description">{description}</textarea>
    <label for="hours">Hours</label>
    <input id="hours" type="number" name="hours" value="{hours}" min="0" max="{max}" step="0.25" required>
    <button type="submit">Save</button>
    <a class="btn btn-secondary" href="/worklog/list">Back to entries</a>
  </form>
</div>"#,
            title = escape(view.title),
            success = message_block("success", view.success),
            error = message_block("error", view.error),
            action = escape(&view.action),
            date = escape(&view.form.date),
            description = escape(&view.form.description),
            hours = escape(&view.form.hours),
            max = MAX_HOURS_PER_ENTRY,
        ),
    )
}

pub fn entry_list_page(username: &str, entries: &[WorkLog], filter: &FilterValues, error: Option<&str>) -> RawHtml<String> {
    let rows: String = entries
        .iter()
        .map(|entry| {
            format!(
                r#"<tr>
  <td>{date}</td>
  <td>{description}</td>
  <td class="num">{hours}</td>
  <td>
    <a href="/worklog/edit/{id}">Edit</a>
    <form class="inline" method="POST" action="/worklog/delete/{id}" onsubmit="return confirm('Delete this entry?');">
      <button class="btn-danger" type="submit">Delete</button>
    </form>
  </td>
</tr>"#,
                date = entry.date.format("%d.%m.%Y"),
                description = escape(&entry.description),
                hours = hours(entry.hours),
                id = entry.id,
            )
        })
        .collect();

    let total: f64 = entries.iter().map(|e| e.hours).sum();
    let table = if entries.is_empty() {
        "<p>No entries match.</p>".to_string()
    } else {
        format!(
            r#"<table>
<thead><tr><th>Date</th><th>Description</th><th class="num">Hours</th><th></th></tr></thead>
<tbody>{rows}</tbody>
<tfoot><tr><th colspan="2">Total</th><th class="num">{total}</th><th></th></tr></tfoot>
</table>"#,
            total = hours(total),
        )
    };

    layout(
        "Entries",
        Some(username),
        &format!(
            r#"<div class="card">
  <h1>Entries</h1>
  {error}
  <form class="filters" method="GET" action="/worklog/list">
    <div><label for="date_from">From</label><input id="date_from" type="date" name="date_from" value="{date_from}"></div>
    <div><label for="date_to">To</label><input id="date_to" type="date" name="date_to" value="{date_to}"></div>
    <div><label for="search">Search</label><input id="search" type="text" name="search" value="{search}"></div>
    <div><button type="submit">Filter</button> <a class="btn btn-secondary" href="/worklog/list">Reset</a></div>
  </form>
  <p><a class="btn" href="/worklog/export{query}">Export to Excel</a></p>
  {table}
</div>"#,
            error = message_block("error", error),
            date_from = escape(&filter.date_from),
            date_to = escape(&filter.date_to),
            search = escape(&filter.search),
            query = escape(&filter.query_string()),
        ),
    )
}

fn bar_rows<'a>(rows: impl Iterator<Item = (&'a str, f64)>, max: f64) -> String {
    rows.map(|(label, value)| {
        let width = if max > 0.0 { value / max * 100.0 } else { 0.0 };
        format!(
            r#"<tr><td>{label}</td><td style="width:60%"><div class="bar" style="width:{width:.1}%"></div></td><td class="num">{value}</td></tr>"#,
            label = escape(label),
            value = hours(value),
        )
    })
    .collect()
}

fn period_table(title: &str, periods: &[PeriodTotal]) -> String {
    let max = periods.iter().map(|p| p.total_hours).fold(0.0, f64::max);
    format!(
        r#"<div class="card"><h2>{title}</h2><table>{rows}</table></div>"#,
        rows = bar_rows(periods.iter().map(|p| (p.label.as_str(), p.total_hours)), max),
    )
}

pub fn reports_page(username: &str, report: &WorkReport) -> RawHtml<String> {
    let body = if report.stats.days_count == 0 {
        r#"<div class="card"><h1>Reports</h1><p>No entries yet. <a href="/worklog/new">Add your first one.</a></p></div>"#.to_string()
    } else {
        let max_daily = report.daily.hours.iter().copied().fold(0.0, f64::max);
        let daily = bar_rows(report.daily.labels.iter().map(String::as_str).zip(report.daily.hours.iter().copied()), max_daily);

        format!(
            r#"<div class="card"><h1>Reports</h1>{stats}</div>
{monthly}
{weekly}
<div class="card"><h2>By day</h2><table>{daily}</table></div>"#,
            stats = stats_block(&report.stats),
            monthly = period_table("By month", &report.monthly),
            weekly = period_table("By ISO week", &report.weekly),
        )
    };

    layout("Reports", Some(username), &body)
}

pub fn error_page(status: Status, message: &str) -> RawHtml<String> {
    layout(
        status.reason().unwrap_or("Error"),
        None,
        &format!(
            r#"<div class="card narrow">
  <h1>{code}</h1>
  <p>{message}</p>
  <a class="btn" href="/dashboard">Back to dashboard</a>
</div>"#,
            code = status.code,
            message = escape(message),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::report::aggregate;
    use chrono::NaiveDate;

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(escape(r#"<b onclick="x">Tom & 'Jerry'</b>"#), "&lt;b onclick=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn hours_drop_trailing_zeros() {
        assert_eq!(hours(7.5), "7.5");
        assert_eq!(hours(8.0), "8");
        assert_eq!(hours(0.25), "0.25");
    }

    #[test]
    fn filter_query_string_skips_blanks_and_encodes() {
        let filter = FilterValues {
            date_from: "2024-01-01".into(),
            date_to: String::new(),
            search: "code review".into(),
        };
        assert_eq!(filter.query_string(), "?date_from=2024-01-01&search=code%20review");
        assert_eq!(FilterValues::default().query_string(), "");
    }

    #[test]
    fn entry_descriptions_are_escaped_in_listing() {
        let entry = WorkLog {
            id: 3,
            user_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            description: "<script>alert(1)</script>".into(),
            hours: 3.0,
        };
        let RawHtml(html) = entry_list_page("alice", &[entry], &FilterValues::default(), None);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("08.01.2024"));
        assert!(html.contains("/worklog/edit/3"));
    }

    #[test]
    fn login_page_shows_timeout_notice_only_when_asked() {
        let RawHtml(with) = login_page(None, true, "");
        let RawHtml(without) = login_page(None, false, "");
        assert!(with.contains("session expired"));
        assert!(!without.contains("session expired"));
    }

    #[test]
    fn reports_page_lists_periods() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let report = aggregate([(day(1), 2.0), (day(8), 3.0)]);
        let RawHtml(html) = reports_page("alice", &report);
        assert!(html.contains("01/2024"));
        assert!(html.contains("2024-W01"));
        assert!(html.contains("2024-W02"));
        assert!(html.contains("08.01"));
    }
}
