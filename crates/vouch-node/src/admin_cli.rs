//! vouch-admin CLI tool
//!
//! Runs bot commands against a running vouch-node.
//!
//! Usage:
//!   vouch-admin vouch <actor> <target> <proof_url> <content_type>
//!   vouch-admin vouches <user>
//!   vouch-admin top10-today
//!   vouch-admin vouch-add <user> <amount>
//!   vouch-admin vouch-revoke <user> <amount>
//!   vouch-admin vouch-reset <user>
//!   vouch-admin set-trusted-role <role>
//!   vouch-admin set-vouch-log-channel <channel>
//!   vouch-admin set-vouch-channel <channel>
//!   vouch-admin ping
//!   vouch-admin vouch-status
//!   vouch-admin ping-check <messages.json>
//!   vouch-admin subscribe

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use vouch_node::admin_socket::{default_socket_path, AdminCommand, AdminResponse};

fn print_usage() {
    eprintln!("vouch-admin - Run vouch bot commands against a vouch-node");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  vouch-admin vouch <actor> <target> <proof_url> <content_type>");
    eprintln!("                                            Submit a vouch with image proof");
    eprintln!("  vouch-admin vouches <user>                Check a user's vouches");
    eprintln!("  vouch-admin top10-today                   Today's top 10 vouched users");
    eprintln!("  vouch-admin vouch-add <user> <amount>     Add vouches");
    eprintln!("  vouch-admin vouch-revoke <user> <amount>  Revoke vouches");
    eprintln!("  vouch-admin vouch-reset <user>            Reset a user's vouch data");
    eprintln!("  vouch-admin set-trusted-role <role>       Set the trusted role");
    eprintln!("  vouch-admin set-vouch-log-channel <ch>    Set the log channel");
    eprintln!("  vouch-admin set-vouch-channel <ch>        Set the listener channel");
    eprintln!("  vouch-admin ping                          Check latency");
    eprintln!("  vouch-admin vouch-status                  Ledger-wide statistics");
    eprintln!("  vouch-admin ping-check <messages.json>    Count vouch pings in a history export");
    eprintln!("  vouch-admin subscribe                     Stream platform events");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOUCH_SOCKET  Path to admin socket (default: ./vouch-data/admin.sock)");
}

fn get_socket_path() -> PathBuf {
    std::env::var("VOUCH_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default_socket_path()))
}

fn connect() -> Result<UnixStream, String> {
    let socket_path = get_socket_path();
    UnixStream::connect(&socket_path).map_err(|e| {
        format!(
            "Failed to connect to vouch-node at {:?}: {}\n\
             Is the vouch-node running?",
            socket_path, e
        )
    })
}

fn send_command(cmd: &AdminCommand) -> Result<AdminResponse, String> {
    let mut stream = connect()?;

    let cmd_json = serde_json::to_string(cmd).map_err(|e| e.to_string())?;
    writeln!(stream, "{}", cmd_json).map_err(|e| e.to_string())?;

    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(|e| e.to_string())?;

    serde_json::from_str(&response_line).map_err(|e| format!("Invalid response: {}", e))
}

fn subscribe() -> Result<(), String> {
    let mut stream = connect()?;
    writeln!(stream, "{{\"cmd\": \"subscribe\"}}").map_err(|e| e.to_string())?;

    let reader = BufReader::new(&stream);
    for line in reader.lines() {
        println!("{}", line.map_err(|e| e.to_string())?);
    }
    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn arg<T: FromStr>(args: &[String], index: usize, name: &str) -> T {
    let Some(raw) = args.get(index) else {
        fail(&format!("{} requires a {} argument", args[1], name));
    };
    raw.parse()
        .unwrap_or_else(|_| fail(&format!("invalid {}: {}", name, raw)))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let cmd = match args[1].as_str() {
        "vouch" => AdminCommand::Vouch {
            actor: arg(&args, 2, "actor"),
            target: arg(&args, 3, "target"),
            proof_url: arg(&args, 4, "proof_url"),
            content_type: arg(&args, 5, "content_type"),
        },
        "vouches" => AdminCommand::Vouches {
            user: arg(&args, 2, "user"),
        },
        "top10-today" => AdminCommand::Top10Today,
        "vouch-add" => AdminCommand::VouchAdd {
            user: arg(&args, 2, "user"),
            amount: arg(&args, 3, "amount"),
        },
        "vouch-revoke" => AdminCommand::VouchRevoke {
            user: arg(&args, 2, "user"),
            amount: arg(&args, 3, "amount"),
        },
        "vouch-reset" => AdminCommand::VouchReset {
            user: arg(&args, 2, "user"),
        },
        "set-trusted-role" => AdminCommand::SetTrustedRole {
            role: arg(&args, 2, "role"),
        },
        "set-vouch-log-channel" => AdminCommand::SetVouchLogChannel {
            channel: arg(&args, 2, "channel"),
        },
        "set-vouch-channel" => AdminCommand::SetVouchChannel {
            channel: arg(&args, 2, "channel"),
        },
        "ping" => AdminCommand::Ping,
        "vouch-status" => AdminCommand::VouchStatus,
        "ping-check" => {
            let path: PathBuf = arg(&args, 2, "messages file");
            let data = std::fs::read(&path)
                .unwrap_or_else(|e| fail(&format!("cannot read {:?}: {}", path, e)));
            let messages = serde_json::from_slice(&data)
                .unwrap_or_else(|e| fail(&format!("invalid messages file: {}", e)));
            AdminCommand::PingCheck { messages }
        }
        "subscribe" => {
            if let Err(e) = subscribe() {
                fail(&e);
            }
            return;
        }
        "-h" | "--help" | "help" => {
            print_usage();
            std::process::exit(0);
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    };

    let started = Instant::now();
    match send_command(&cmd) {
        Ok(response) => match response {
            AdminResponse::Ok { message } => {
                println!("{}", message);
            }
            AdminResponse::Error { error } => {
                eprintln!("Error: {}", error);
                std::process::exit(1);
            }
            AdminResponse::Stats {
                user,
                total,
                today,
                streak,
                trusted,
            } => {
                println!("Vouch stats for {}", user);
                println!("  Total:   {}", total);
                println!("  Today:   {}", today);
                println!("  Streak:  {} days", streak);
                println!("  Trusted: {}", trusted);
            }
            AdminResponse::Ranking { title, entries } => {
                println!("{}", title);
                if entries.is_empty() {
                    println!("(none)");
                }
                for (i, entry) in entries.iter().enumerate() {
                    println!("#{} {} - {}", i + 1, entry.user, entry.count);
                }
            }
            AdminResponse::Status {
                total_all,
                user_count,
                today_total,
            } => {
                println!("Total Vouches: {}", total_all);
                println!("Users:         {}", user_count);
                println!("Today:         {}", today_total);
            }
            AdminResponse::Recorded { users } => {
                println!("Recorded vouches for {} user(s)", users.len());
            }
            AdminResponse::Pong { latency_ms } => {
                println!(
                    "pong - vouch-node is running (ledger {}ms, round trip {}ms)",
                    latency_ms,
                    started.elapsed().as_millis()
                );
            }
            AdminResponse::Subscribed => {
                println!("subscribed");
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
