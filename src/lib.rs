pub mod config;
pub mod measure;
pub mod net;
pub mod queue;
pub mod replay;
pub mod topo;

#[cfg(test)]
mod test;
