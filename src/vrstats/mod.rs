pub mod audit;
pub mod classify;
pub mod config;
pub mod congress;
pub mod county;
pub mod dates;
pub mod harvest;
pub mod http;
pub mod materialize;
pub mod naming;
pub mod paths;
pub mod proper_case;
pub mod table;
pub mod total;
