pub mod retry;

#[cfg(test)]
pub mod test_server;
