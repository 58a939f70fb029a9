use std::fmt::Write;

use super::{EventCard, Page, Report, Section};
use crate::model::{Capacity, ParticipationTrend};

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 160.0;
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const STYLE: &str = "\
body{font-family:Helvetica,Arial,sans-serif;color:#1d1d1f;margin:0}\
.page{width:210mm;min-height:297mm;padding:16mm;box-sizing:border-box;page-break-after:always;position:relative}\
.metrics{display:grid;grid-template-columns:repeat(4,1fr);gap:8px}\
.metric{border:1px solid #ddd;border-radius:6px;padding:8px}\
.metric .value{font-size:20px;font-weight:bold}\
.badge{background:#fff3cd;padding:2px 6px;border-radius:4px;font-size:12px}\
.event-card{border:1px solid #ddd;border-radius:6px;padding:10px;margin-bottom:10px}\
.page-footer{position:absolute;bottom:10mm;left:16mm;right:16mm;font-size:11px;color:#666}";

impl Report {
    /// Print-ready HTML, one `.page` element per page.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title><style>{STYLE}</style></head><body>",
            escape(&self.title)
        );
        for page in self.pages() {
            self.render_page(&mut out, &page);
        }
        out.push_str("</body></html>");
        out
    }

    fn render_page(&self, out: &mut String, page: &Page<'_>) {
        let _ = write!(out, "<section class=\"page\" data-page=\"{}\">", page.number);
        for section in &page.sections {
            match section {
                Section::Header => self.render_header(out),
                Section::Metrics => self.render_metrics(out),
                Section::Trend => render_trend(out, &self.trend),
                Section::TeamStats => self.render_team_stats(out),
                Section::Events(cards) => {
                    out.push_str("<div class=\"events\">");
                    for card in *cards {
                        render_card(out, card);
                    }
                    out.push_str("</div>");
                }
            }
        }
        let _ = write!(
            out,
            "<footer class=\"page-footer\">Generated {} &middot; Page {} of {}</footer></section>",
            self.generated_at.format(DATE_FORMAT),
            page.number,
            page.total
        );
    }

    fn render_header(&self, out: &mut String) {
        let _ = write!(
            out,
            "<header class=\"report-header\"><h1>{}</h1><p>Generated {} UTC</p>",
            escape(&self.title),
            self.generated_at.format(DATE_FORMAT)
        );
        if self.snapshot.is_estimated {
            out.push_str(
                "<p class=\"badge estimated\">Estimated figures: no participation data recorded yet</p>",
            );
        }
        out.push_str("</header>");
    }

    fn render_metrics(&self, out: &mut String) {
        out.push_str("<div class=\"metrics\">");
        for tile in self.metrics() {
            let _ = write!(
                out,
                "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
                tile.label, tile.value
            );
        }
        out.push_str("</div>");
    }

    fn render_team_stats(&self, out: &mut String) {
        let stats = &self.team_stats;
        let _ = write!(
            out,
            "<div class=\"team-stats\"><h2>Teams</h2><ul>\
             <li class=\"registered-teams\">{} of {} teams registered for events</li>\
             <li>{} registered members, {} verified</li></ul></div>",
            stats.registered_teams, stats.total_teams, stats.registered_members, stats.verified_members
        );
    }
}

fn render_trend(out: &mut String, trend: &ParticipationTrend) {
    out.push_str("<div class=\"trend\"><h2>Participation, last 30 days</h2>");
    if trend.is_synthetic() {
        out.push_str(
            "<p class=\"badge synthetic\">Illustrative trend: not enough real event data</p>",
        );
    }

    let peak = f64::from(trend.peak().max(1));
    let step = if trend.points.len() > 1 {
        CHART_WIDTH / (trend.points.len() - 1) as f64
    } else {
        0.0
    };
    let points: Vec<String> = trend
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = i as f64 * step;
            let y = CHART_HEIGHT - f64::from(p.participants) / peak * CHART_HEIGHT;
            format!("{x:.1},{y:.1}")
        })
        .collect();
    let _ = write!(
        out,
        "<svg class=\"trend-chart\" width=\"{CHART_WIDTH}\" height=\"{CHART_HEIGHT}\" viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\">\
         <polyline fill=\"none\" stroke=\"#6c5ce7\" stroke-width=\"2\" points=\"{}\"/></svg>",
        points.join(" ")
    );
    if let (Some(first), Some(last)) = (trend.points.first(), trend.points.last()) {
        let _ = write!(
            out,
            "<p class=\"trend-range\">{} to {}, peak {}</p>",
            first.date,
            last.date,
            trend.peak()
        );
    }
    out.push_str("</div>");
}

fn render_card(out: &mut String, card: &EventCard) {
    let capacity = match card.capacity {
        Capacity::Teams { teams, per_team } => format!("{teams} teams of {per_team}"),
        Capacity::Spots(spots) => format!("{spots} spots"),
    };
    let _ = write!(
        out,
        "<article class=\"event-card\" data-event-id=\"{}\"><h3>{}</h3>\
         <p class=\"meta\">{} &middot; {} &middot; {} to {}</p>\
         <p class=\"capacity\">Capacity: {} &middot; {} participants, {} verified</p>",
        escape(&card.event_id),
        escape(&card.name),
        card.category,
        card.status,
        card.start_date.format(DATE_FORMAT),
        card.end_date.format(DATE_FORMAT),
        capacity,
        card.participants,
        card.verified
    );
    if !card.team_names.is_empty() {
        let names: Vec<String> = card.team_names.iter().map(|n| escape(n)).collect();
        let _ = write!(out, "<p class=\"teams\">Teams: {}</p>", names.join(", "));
    }
    if let Some(referee) = &card.referee {
        let _ = write!(out, "<p class=\"referee\">Referee: {}</p>", escape(referee));
    }
    if !card.placements.is_empty() {
        out.push_str("<ol class=\"placements\">");
        for (rank, who) in &card.placements {
            let _ = write!(out, "<li>{rank}: {}</li>", escape(who));
        }
        out.push_str("</ol>");
    }
    out.push_str("</article>");
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
