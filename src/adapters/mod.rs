// Adapters layer: concrete implementations of the external collaborators (http, local files, csv, html links).

pub mod csv_grid;
pub mod http;
pub mod links;
pub mod local;
