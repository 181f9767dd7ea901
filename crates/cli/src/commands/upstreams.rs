use ferrous_doh_domain::Config;

pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let upstream = &config.upstream;

    if json {
        println!("{}", serde_json::to_string_pretty(upstream)?);
        return Ok(());
    }

    println!("policy:    {}", upstream.policy);
    println!("timeout:   {} ms", upstream.timeout_ms);
    if upstream.max_fails == 0 {
        println!("max_fails: 0 (health checking disabled)");
    } else {
        println!("max_fails: {}", upstream.max_fails);
    }
    println!("servers:");
    if upstream.servers.is_empty() {
        println!("  (none)");
    }
    for (index, server) in upstream.servers.iter().enumerate() {
        println!("  [{}] {}", index, server);
    }
    Ok(())
}
