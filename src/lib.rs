/*!
# MessMass Engine

The statistics engine behind the MessMass event-reporting application,
built in Rust.

## Overview

MessMass tracks per-event audience counters (indoor/outdoor fans, web and
QR-code visits, merchandise, demographics) and turns them into derived
KPI values and charts through operator-configured formulas. This crate is
the engine under that application: the formula evaluator, the chart
computation layer it feeds, and the persistence and serving plumbing
around them. The admin UI that edits projects and chart configurations is
a separate frontend and talks to this engine over JSON.

## Architecture

### Formula Evaluator
- Bracket-notation field references (`[visitWeb]`, `[eventAttendees]`)
  over a dynamically-keyed stats record
- Arithmetic with standard precedence, parentheses and unary minus
- A single not-applicable sentinel for every failure mode: malformed
  formulas, zero divisors, non-finite results. The evaluator never
  errors and never panics; dashboards render "N/A" instead of crashing.

### Chart Layer
- Pie, bar and KPI chart configurations owning formula strings
- Segment values, totals and percentages computed per stats record
- Caller-side value formatting (unit prefix/suffix, thousands grouping)

### Data Persistence Layer
- Gzip-compressed bincode project files
- JSON interchange for projects and chart-configuration documents
- CSV export of raw counters and computed chart values

## Modules

- **stats**: the flat string-keyed stats record (missing vs zero)
- **formula**: tokenizer, parser and evaluator for the formula language
- **chart**: chart/KPI configuration types and chart computation
- **project**: the event entity (id, date, hashtags, stats)
- **saving**: binary persistence and JSON interchange
- **export**: CSV export
- **app**: JSON API routing (feature `web`)

## REST API Endpoints (feature `web`)

- `GET  /api/project` - Retrieves the current project
- `POST /api/stats` - Upserts or removes a stat field
- `POST /api/evaluate` - Evaluates a formula against the current stats
- `GET  /api/charts` - Computed charts for the current stats
- `PUT  /api/charts` - Replaces the chart configuration set
- `POST /api/save`, `POST /api/load` - Persists/restores a project file
- `GET  /api/export/csv` - CSV download
*/

// Re-export all modules so they appear in the documentation
#[cfg(feature = "web")]
pub mod app;
pub mod chart;
pub mod export;
pub mod formula;
pub mod project;
pub mod saving;
pub mod stats;

/// Re-export everything from these modules to make it easier to use
pub use chart::*;
pub use export::*;
pub use formula::*;
pub use project::*;
pub use saving::*;
pub use stats::*;
