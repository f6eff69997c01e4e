//! Step-by-step DNS record setup per provider control panel

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInstructions {
    #[serde(default)]
    pub setup_steps: Vec<String>,
    #[serde(default)]
    pub spf_steps: Vec<String>,
    #[serde(default)]
    pub dmarc_steps: Vec<String>,
    #[serde(default)]
    pub dkim_steps: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Instructions for the provider `code`; unknown codes get the generic set
pub fn provider_instructions(code: &str) -> ProviderInstructions {
    match code {
        "godaddy" => godaddy(),
        "cloudflare" => cloudflare(),
        "namecheap" => namecheap(),
        _ => generic(),
    }
}

fn godaddy() -> ProviderInstructions {
    ProviderInstructions {
        setup_steps: lines(&[
            "Log in to your GoDaddy account at godaddy.com",
            "Go to your account and select \"My Products\"",
            "Find your domain and click \"DNS\" or \"Manage DNS\"",
            "Look for the \"Records\" section",
        ]),
        spf_steps: lines(&[
            "In the DNS Management page, click \"Add\" to create a new record",
            "Select \"TXT\" as the record type",
            "Leave the \"Host\" field blank (or enter \"@\")",
            "In the \"TXT Value\" field, paste your SPF record exactly as provided",
            "Set TTL to 1 hour (3600 seconds)",
            "Click \"Save\" to add the record",
        ]),
        dmarc_steps: lines(&[
            "Click \"Add\" to create another new TXT record",
            "Select \"TXT\" as the record type",
            "In the \"Host\" field, enter \"_dmarc\"",
            "In the \"TXT Value\" field, paste your DMARC policy",
            "Set TTL to 1 hour (3600 seconds)",
            "Click \"Save\" to add the DMARC record",
        ]),
        dkim_steps: lines(&[
            "Get your DKIM record from your email provider (Google, Microsoft, etc.)",
            "Click \"Add\" to create a new TXT record",
            "In the \"Host\" field, enter the DKIM selector (e.g., \"selector1._domainkey\")",
            "In the \"TXT Value\" field, paste the DKIM public key",
            "Set TTL to 1 hour",
            "Save the record",
        ]),
        notes: lines(&[
            "DNS changes at GoDaddy usually propagate within 1 hour",
            "You can verify changes using GoDaddy's DNS checker tool",
            "Make sure to remove any conflicting existing records",
        ]),
    }
}

fn cloudflare() -> ProviderInstructions {
    ProviderInstructions {
        setup_steps: lines(&[
            "Log in to your Cloudflare dashboard at cloudflare.com",
            "Select the domain you want to configure",
            "Navigate to the \"DNS\" tab in the main menu",
            "Look for the \"Records\" section",
        ]),
        spf_steps: lines(&[
            "Click the \"Add record\" button",
            "Select \"TXT\" from the Type dropdown",
            "In the \"Name\" field, enter \"@\" (represents root domain)",
            "In the \"Content\" field, paste your SPF record",
            "Leave \"TTL\" as \"Auto\" or set to 1 hour",
            "Click \"Save\" to add the record",
        ]),
        dmarc_steps: lines(&[
            "Click \"Add record\" for a new TXT record",
            "Select \"TXT\" as the type",
            "In the \"Name\" field, enter \"_dmarc\"",
            "In the \"Content\" field, paste your DMARC policy",
            "Set TTL to \"Auto\" or 1 hour",
            "Click \"Save\"",
        ]),
        dkim_steps: lines(&[
            "Obtain DKIM record from your email service provider",
            "Click \"Add record\"",
            "Select \"TXT\" as type",
            "Enter the DKIM selector in \"Name\" (e.g., \"selector1._domainkey\")",
            "Paste DKIM public key in \"Content\"",
            "Save the record",
        ]),
        notes: lines(&[
            "Cloudflare DNS changes are usually instant",
            "Use Cloudflare's DNS checker to verify records",
            "Orange cloud (proxied) should be off for email records",
        ]),
    }
}

fn namecheap() -> ProviderInstructions {
    ProviderInstructions {
        setup_steps: lines(&[
            "Log in to your Namecheap account",
            "Go to \"Domain List\" in your dashboard",
            "Find your domain and click \"Manage\"",
            "Click on the \"Advanced DNS\" tab",
        ]),
        spf_steps: lines(&[
            "Click \"Add New Record\" button",
            "Select \"TXT Record\" from the dropdown",
            "Leave \"Host\" field as \"@\"",
            "In the \"Value\" field, paste your SPF record",
            "Set TTL to 1800 (30 minutes) or use Automatic",
            "Click the green checkmark to save",
        ]),
        dmarc_steps: lines(&[
            "Click \"Add New Record\"",
            "Select \"TXT Record\"",
            "In \"Host\" field, enter \"_dmarc\"",
            "Paste DMARC policy in \"Value\" field",
            "Set appropriate TTL",
            "Save the record",
        ]),
        dkim_steps: lines(&[
            "Get DKIM record from email provider",
            "Add new TXT record",
            "Enter DKIM selector as Host (e.g., \"selector1._domainkey\")",
            "Paste DKIM key as Value",
            "Save the record",
        ]),
        notes: lines(&[
            "Namecheap DNS changes typically take 30 minutes to 4 hours",
            "Free DNS is included with all domain registrations",
            "Check \"Domain\" tab to ensure DNS is pointed to Namecheap servers",
        ]),
    }
}

fn generic() -> ProviderInstructions {
    ProviderInstructions {
        setup_steps: lines(&[
            "Log in to your domain registrar or DNS hosting provider",
            "Look for \"DNS Management\", \"DNS Zone\", or \"DNS Records\" section",
            "Find the area where you can add or edit DNS records",
            "Locate TXT record management options",
        ]),
        spf_steps: lines(&[
            "Create a new TXT record",
            "Set the name/host to \"@\" or leave blank for root domain",
            "Paste your SPF record in the value/content field",
            "Set TTL to 3600 seconds (1 hour) if available",
            "Save or apply the changes",
        ]),
        dmarc_steps: lines(&[
            "Add another TXT record",
            "Set name/host to \"_dmarc\"",
            "Enter your DMARC policy as the value",
            "Set appropriate TTL",
            "Save the record",
        ]),
        dkim_steps: lines(&[
            "Obtain DKIM record from your email service provider",
            "Create new TXT record",
            "Use DKIM selector as the name (e.g., \"selector1._domainkey\")",
            "Enter DKIM public key as value",
            "Save the configuration",
        ]),
        notes: lines(&[
            "DNS propagation time varies by provider (15 minutes to 24 hours)",
            "Verify records using online DNS lookup tools",
            "Contact your provider's support if you need assistance",
        ]),
    }
}
