use jugglegraph_engine::{DEFAULT_ENGINE_URL, ENGINE_URL_ENV, EngineConfig};

// Kept in its own test binary: it is the only test that touches the process
// environment.
#[test]
fn base_url_comes_from_environment() {
    unsafe { std::env::remove_var(ENGINE_URL_ENV) };
    assert_eq!(EngineConfig::from_env().base_url, DEFAULT_ENGINE_URL);

    unsafe { std::env::set_var(ENGINE_URL_ENV, "http://engine:9000") };
    assert_eq!(EngineConfig::from_env().base_url, "http://engine:9000");

    unsafe { std::env::set_var(ENGINE_URL_ENV, "  ") };
    assert_eq!(EngineConfig::from_env().base_url, DEFAULT_ENGINE_URL);

    unsafe { std::env::remove_var(ENGINE_URL_ENV) };
}
