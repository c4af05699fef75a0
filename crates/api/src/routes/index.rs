//! Landing page listing the available routes.

use axum::{extract::State, response::Html};
use std::sync::Arc;
use surfsup_db::DatasetSummary;

use crate::AppState;

const ROUTES: [&str; 3] = [
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
];

/// Render the index page for a dataset.
///
/// Without a summary (no observations yet) the examples and date bounds are
/// left out.
pub fn render_index(summary: Option<&DatasetSummary>) -> String {
    let mut page = String::from("Available Routes:<br/><br/>");
    for route in ROUTES {
        page.push_str(&format!("<a href=\"{route}\">{route}</a><br/>"));
    }

    let Some(summary) = summary else {
        page.push_str("<br/>/api/v1.0/YYYY-MM-DD<br/>");
        page.push_str("/api/v1.0/YYYY-MM-DD/YYYY-MM-DD<br/><br/>");
        page.push_str("The database contains no observations.<br/>");
        return page;
    };

    page.push_str("<br/>/api/v1.0/YYYY-MM-DD<br/>");
    page.push_str(&format!(
        "Temperature statistics for a single date, example: {}<br/><br/>",
        summary.first_date
    ));
    page.push_str("/api/v1.0/YYYY-MM-DD/YYYY-MM-DD<br/>");
    page.push_str(&format!(
        "Temperature statistics for an inclusive date range, example: {}/{}<br/><br/>",
        summary.first_date, summary.last_date
    ));
    page.push_str("The database ranges are:<br/>");
    page.push_str(&format!("{}<br/>{}<br/>", summary.first_date, summary.last_date));
    page
}

/// List all available routes.
pub async fn welcome(State(state): State<Arc<AppState>>) -> Html<String> {
    state.metrics.inc_http_requests("index");
    Html(render_index(state.summary.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_shows_routes_and_bounds() {
        let page = render_index(Some(&DatasetSummary {
            first_date: "2010-01-01".into(),
            last_date: "2017-08-23".into(),
            station_count: 9,
            observation_count: 19550,
        }));

        for route in ROUTES {
            assert!(page.contains(route));
        }
        assert!(page.contains("The database ranges are:<br/>2010-01-01<br/>2017-08-23<br/>"));
        assert!(page.contains("example: 2010-01-01/2017-08-23"));
    }

    #[test]
    fn test_index_without_observations() {
        let page = render_index(None);

        for route in ROUTES {
            assert!(page.contains(route));
        }
        assert!(page.contains("/api/v1.0/YYYY-MM-DD/YYYY-MM-DD"));
        assert!(page.contains("no observations"));
        assert!(!page.contains("The database ranges are"));
    }
}
