use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use serde_json::json;

#[derive(Parser)]
#[command(name = "incident-desk-cli")]
#[command(about = "Incident desk CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "INCIDENT_DESK_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List incidents
    List {
        #[arg(short = 'S', long)]
        status: Option<String>,

        #[arg(short = 'P', long)]
        priority: Option<String>,

        /// Free-text search (ignored when status or priority is set)
        #[arg(short, long)]
        query: Option<String>,

        /// Only incidents owned by this email
        #[arg(short, long)]
        responsible: Option<String>,

        #[arg(short, long, default_value = "0")]
        page: u32,

        #[arg(short = 's', long, default_value = "20")]
        size: u32,

        /// `field` or `field,direction`
        #[arg(long)]
        sort: Option<String>,
    },

    /// Get incident details
    Get {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,
    },

    /// Create an incident
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short = 'P', long, default_value = "MEDIUM")]
        priority: String,

        #[arg(short = 'S', long, default_value = "OPEN")]
        status: String,

        #[arg(short, long)]
        responsible: String,

        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Change the status of an incident
    Status {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,

        #[arg(value_name = "STATUS")]
        status: String,
    },

    /// Delete an incident
    Delete {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,
    },

    /// List the comments of an incident
    Comments {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,

        #[arg(short, long, default_value = "0")]
        page: u32,

        #[arg(short = 's', long, default_value = "20")]
        size: u32,
    },

    /// Comment on an incident
    Comment {
        #[arg(value_name = "INCIDENT_ID")]
        id: String,

        #[arg(short, long)]
        author: String,

        #[arg(short, long)]
        message: String,
    },

    /// Incident counts by status and priority
    Stats,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/');

    let request = match cli.command {
        Commands::List {
            status,
            priority,
            query,
            responsible,
            page,
            size,
            sort,
        } => {
            let mut params = vec![("page", page.to_string()), ("size", size.to_string())];
            if let Some(sort) = sort {
                params.push(("sort", sort));
            }

            match responsible {
                Some(email) => client
                    .get(format!("{}/v1/incidents/responsible/{}", endpoint, email))
                    .query(&params),
                None => {
                    if let Some(status) = status {
                        params.push(("status", status.to_uppercase()));
                    }
                    if let Some(priority) = priority {
                        params.push(("priority", priority.to_uppercase()));
                    }
                    if let Some(query) = query {
                        params.push(("q", query));
                    }
                    client
                        .get(format!("{}/v1/incidents", endpoint))
                        .query(&params)
                }
            }
        }

        Commands::Get { id } => client.get(format!("{}/v1/incidents/{}", endpoint, id)),

        Commands::Create {
            title,
            description,
            priority,
            status,
            responsible,
            tags,
        } => client
            .post(format!("{}/v1/incidents", endpoint))
            .json(&json!({
                "title": title,
                "description": description,
                "priority": priority.to_uppercase(),
                "status": status.to_uppercase(),
                "responsible_email": responsible,
                "tags": tags,
            })),

        Commands::Status { id, status } => client
            .patch(format!("{}/v1/incidents/{}/status", endpoint, id))
            .query(&[("status", status.to_uppercase())]),

        Commands::Delete { id } => client.delete(format!("{}/v1/incidents/{}", endpoint, id)),

        Commands::Comments { id, page, size } => client
            .get(format!("{}/v1/comments/incident/{}", endpoint, id))
            .query(&[("page", page), ("size", size)]),

        Commands::Comment {
            id,
            author,
            message,
        } => client
            .post(format!("{}/v1/comments", endpoint))
            .json(&json!({
                "incident_id": id,
                "author": author,
                "message": message,
            })),

        Commands::Stats => client.get(format!("{}/v1/stats/incidents", endpoint)),

        Commands::Health => client.get(format!("{}/health", endpoint)),
    };

    send(request).await
}

async fn send(request: RequestBuilder) -> anyhow::Result<()> {
    let response = request
        .send()
        .await
        .context("failed to reach the incident desk server")?;
    let status = response.status();
    let text = response.text().await.context("failed to read response body")?;

    if text.is_empty() {
        println!("{}", status);
    } else {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
            Err(_) => println!("{}", text),
        }
    }

    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
