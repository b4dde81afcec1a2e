//! parley-ctl: command-line client for the Parley broker.

mod cmd;

use anyhow::{Context, Result};

use cmd::http::ApiClient;

const DEFAULT_SERVER: &str = "http://127.0.0.1:9000";
const DEFAULT_COOKIE: &str = "auth=true";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PEER_PORT: u16 = 5001;

fn print_usage() {
    println!("Usage: parley-ctl [--server <url>] [--cookie <k=v>] <command>");
    println!();
    println!("Commands:");
    println!("  status                              Show broker status");
    println!("  peers                               List registered peers");
    println!("  register <peer> <host> <port>       Register a peer address");
    println!("  create <channel>                    Create a channel");
    println!("  join <channel> <peer>               Join a channel");
    println!("  members <channel>                   List members and addresses");
    println!("  send <channel> <peer> <text>        Post a message");
    println!("  sync <channel> [after]              Fetch messages after a cursor");
    println!("  chat <channel> <peer>               Interactive chat relayed by the broker");
    println!("  direct <channel> <peer>             Interactive chat over direct connections");
    println!();
    println!("Options:");
    println!("  --server <url>    Broker or relay base URL (default: {})", DEFAULT_SERVER);
    println!("  --cookie <k=v>    Access gate cookie (default: {})", DEFAULT_COOKIE);
    println!("  --host <host>     Address advertised by chat/direct (default: {})", DEFAULT_HOST);
    println!("  --port <port>     Port advertised by chat/direct (default: {})", DEFAULT_PEER_PORT);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut server = DEFAULT_SERVER.to_string();
    let mut cookie = DEFAULT_COOKIE.to_string();
    let mut host = DEFAULT_HOST.to_string();
    let mut port = DEFAULT_PEER_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--server" => {
                i += 1;
                server = args.get(i).context("--server requires a value")?.clone();
            }
            "--cookie" => {
                i += 1;
                cookie = args.get(i).context("--cookie requires a value")?.clone();
            }
            "--host" => {
                i += 1;
                host = args.get(i).context("--host requires a value")?.clone();
            }
            "--port" => {
                i += 1;
                port = args
                    .get(i)
                    .context("--port requires a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    let api = ApiClient::new(&server, &cookie);

    match remaining.as_slice() {
        ["status"] | [] => cmd::status::cmd_status(&api).await,
        ["peers"] => cmd::peers::cmd_peers(&api).await,
        ["register", peer, peer_host, peer_port] => {
            let peer_port: u16 = peer_port.parse().context("port must be a number")?;
            cmd::peers::cmd_register(&api, peer, peer_host, peer_port).await
        }
        ["create", channel] => cmd::channels::cmd_create(&api, channel).await,
        ["join", channel, peer] => cmd::channels::cmd_join(&api, channel, peer).await,
        ["members", channel] => cmd::channels::cmd_members(&api, channel).await,
        ["send", channel, peer, text @ ..] if !text.is_empty() => {
            cmd::messages::cmd_send(&api, channel, peer, &text.join(" ")).await
        }
        ["sync", channel] => cmd::messages::cmd_sync(&api, channel, 0).await,
        ["sync", channel, after] => {
            let after: u64 = after.parse().context("after must be a number")?;
            cmd::messages::cmd_sync(&api, channel, after).await
        }
        ["chat", channel, peer] => cmd::chat::cmd_chat(&api, channel, peer, &host, port).await,
        ["direct", channel, peer] => {
            cmd::direct::cmd_direct(&api, channel, peer, &host, port).await
        }
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
