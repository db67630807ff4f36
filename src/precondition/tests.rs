use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::*;
use crate::args::Args;
use crate::command::{Command, CommandOptions, CommandRun};
use crate::identifiers::Identifier;
use crate::model::{
    Channel, ChannelKind, InMemoryClient, Member, Message, Permissions, RunContext, User,
};

const BOT: u64 = 900;
const GUILD: u64 = 300;
const AUTHOR: u64 = 100;

struct Noop;

#[async_trait]
impl CommandRun for Noop {
    async fn run(&self, _message: &Message, _args: &mut Args, _context: &RunContext) -> anyhow::Result<Value> {
        Ok(Value::Null)
    }
}

struct Probe {
    name: &'static str,
    pass: bool,
    calls: Arc<AtomicUsize>,
}

impl Probe {
    fn register(registry: &PreconditionRegistry, name: &'static str, pass: bool) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        registry
            .register(Arc::new(Probe {
                name,
                pass,
                calls: Arc::clone(&calls),
            }))
            .unwrap();
        calls
    }
}

#[async_trait]
impl Precondition for Probe {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, _ctx: &PreconditionContext<'_>) -> PreconditionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.pass {
            return Ok(());
        }
        Err(PreconditionError::new(
            self.name,
            Identifier::from(self.name),
            format!("{} failed", self.name),
        ))
    }
}

struct Exploding;

#[async_trait]
impl Precondition for Exploding {
    fn name(&self) -> &str {
        "Exploding"
    }

    async fn run(&self, _ctx: &PreconditionContext<'_>) -> PreconditionResult {
        panic!("checked the wrong thing")
    }
}

struct Fixture {
    message: Message,
    command: Command,
    run_context: RunContext,
    client: InMemoryClient,
    access: AccessPolicy,
    parameters: Value,
}

impl Fixture {
    fn in_channel(channel: Channel) -> Self {
        Self::with_command(channel, CommandOptions::new("ban"))
    }

    fn with_command(channel: Channel, options: CommandOptions) -> Self {
        let author = User::new(AUTHOR, "alice");
        let client = InMemoryClient::new(BOT);
        client.insert_channel(channel.clone());
        Self {
            message: Message::new(1, "!ban", author, channel),
            command: Command::new(options, Noop),
            run_context: RunContext::default(),
            client,
            access: AccessPolicy::default(),
            parameters: Value::Null,
        }
    }

    fn guild() -> Self {
        Self::in_channel(Channel::guild(200, GUILD, "general", ChannelKind::Text))
    }

    fn dm() -> Self {
        Self::in_channel(Channel::dm(201))
    }

    fn ctx(&self) -> PreconditionContext<'_> {
        PreconditionContext {
            message: &self.message,
            command: &self.command,
            run_context: &self.run_context,
            client: &self.client,
            access: &self.access,
            parameters: &self.parameters,
        }
    }

    async fn run(&self, registry: &PreconditionRegistry, node: &PreconditionNode) -> PreconditionResult {
        let ctx = self.ctx();
        node.run(registry, &ctx).await
    }
}

fn empty_registry() -> PreconditionRegistry {
    PreconditionRegistry::new("precondition")
}

#[tokio::test]
async fn test_and_stops_at_first_failure() {
    let registry = empty_registry();
    let a = Probe::register(&registry, "A", false);
    let b = Probe::register(&registry, "B", true);
    let c = Probe::register(&registry, "C", true);

    let node = PreconditionNode::And(vec![
        PreconditionNode::single("A"),
        PreconditionNode::single("B"),
        PreconditionNode::single("C"),
    ]);
    let error = Fixture::guild().run(&registry, &node).await.unwrap_err();

    assert_eq!(error.precondition, "A");
    assert_eq!(a.load(Ordering::SeqCst), 1);
    assert_eq!(b.load(Ordering::SeqCst), 0);
    assert_eq!(c.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_or_stops_at_first_success() {
    let registry = empty_registry();
    let a = Probe::register(&registry, "A", true);
    let b = Probe::register(&registry, "B", false);

    let node = PreconditionNode::Or(vec![PreconditionNode::single("A"), PreconditionNode::single("B")]);
    assert_eq!(Fixture::guild().run(&registry, &node).await, Ok(()));
    assert_eq!(a.load(Ordering::SeqCst), 1);
    assert_eq!(b.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_or_reports_last_failure() {
    let registry = empty_registry();
    Probe::register(&registry, "A", false);
    Probe::register(&registry, "B", false);

    let node = PreconditionNode::Or(vec![PreconditionNode::single("A"), PreconditionNode::single("B")]);
    let error = Fixture::guild().run(&registry, &node).await.unwrap_err();
    assert_eq!(error.message, "B failed");
}

#[tokio::test]
async fn test_empty_nodes() {
    let registry = empty_registry();
    let fixture = Fixture::guild();

    assert_eq!(fixture.run(&registry, &PreconditionNode::And(Vec::new())).await, Ok(()));

    let error = fixture.run(&registry, &PreconditionNode::Or(Vec::new())).await.unwrap_err();
    assert_eq!(error.identifier, Identifier::PreconditionUnsatisfiable);
    assert!(error.is_configuration_defect());
}

#[tokio::test]
async fn test_unavailable_precondition() {
    let error = Fixture::guild()
        .run(&empty_registry(), &PreconditionNode::single("Missing"))
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::UnavailablePrecondition);
    assert_eq!(error.message, "The precondition \"Missing\" is not available.");
}

#[tokio::test]
async fn test_panicking_precondition_is_contained() {
    let registry = empty_registry();
    registry.register(Arc::new(Exploding)).unwrap();

    let error = Fixture::guild()
        .run(&registry, &PreconditionNode::single("Exploding"))
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::PreconditionPanicked);
    assert!(error.message.contains("checked the wrong thing"));
}

#[tokio::test]
async fn test_guild_only_denies_before_alternatives() {
    let registry = PreconditionRegistry::with_defaults(CooldownManager::new());
    let owner = Probe::register(&registry, "OwnerProbe", true);

    let node = PreconditionNode::And(vec![
        PreconditionNode::single("GuildOnly"),
        PreconditionNode::Or(vec![
            PreconditionNode::single("OwnerProbe"),
            PreconditionNode::single_with("HasPermission", json!({ "permissions": ["BAN_MEMBERS"] })),
        ]),
    ]);

    let error = Fixture::dm().run(&registry, &node).await.unwrap_err();
    assert_eq!(error.identifier, Identifier::PreconditionGuildOnly);
    assert_eq!(error.message, "You cannot run this message command in DMs.");
    assert_eq!(owner.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_channel_kind_preconditions() {
    let registry = PreconditionRegistry::with_defaults(CooldownManager::new());
    let news = Fixture::in_channel(Channel::guild(202, GUILD, "updates", ChannelKind::News));
    let dm = Fixture::dm();

    assert_eq!(news.run(&registry, &PreconditionNode::single("NewsOnly")).await, Ok(()));
    let error = news.run(&registry, &PreconditionNode::single("TextOnly")).await.unwrap_err();
    assert_eq!(error.identifier, Identifier::PreconditionTextOnly);

    assert_eq!(dm.run(&registry, &PreconditionNode::single("DMOnly")).await, Ok(()));
    let error = news.run(&registry, &PreconditionNode::single("DMOnly")).await.unwrap_err();
    assert_eq!(error.identifier, Identifier::PreconditionDmOnly);
}

#[tokio::test]
async fn test_owner_only() {
    let registry = PreconditionRegistry::with_defaults(CooldownManager::new());
    let mut fixture = Fixture::guild();

    let error = fixture.run(&registry, &PreconditionNode::single("OwnerOnly")).await.unwrap_err();
    assert_eq!(error.identifier, Identifier::PreconditionOwnerOnly);

    fixture.access.owners.push(AUTHOR);
    assert_eq!(fixture.run(&registry, &PreconditionNode::single("OwnerOnly")).await, Ok(()));
}

#[tokio::test]
async fn test_permission_preconditions() {
    let registry = PreconditionRegistry::with_defaults(CooldownManager::new());
    let fixture = Fixture::guild();
    fixture.client.insert_member(
        Member::new(User::new(AUTHOR, "alice"), GUILD).with_permissions(Permissions::KICK_MEMBERS),
    );
    fixture.client.insert_member(
        Member::new(User::new(BOT, "bot").into_bot(), GUILD).with_permissions(Permissions::ADMINISTRATOR),
    );

    let required = json!({ "permissions": ["BAN_MEMBERS", "KICK_MEMBERS"] });

    let error = fixture
        .run(&registry, &PreconditionNode::single_with("HasPermission", required.clone()))
        .await
        .unwrap_err();
    assert_eq!(error.identifier, Identifier::PreconditionUserPermissions);
    assert_eq!(
        error.message,
        "You are missing the following permissions to run this command: Ban Members"
    );
    assert_eq!(error.context, json!({ "missing": ["BAN_MEMBERS"] }));

    assert_eq!(
        fixture
            .run(&registry, &PreconditionNode::single_with("ClientPermissions", required))
            .await,
        Ok(())
    );
}

#[tokio::test]
async fn test_malformed_payloads_deny_as_configuration_defects() {
    let registry = PreconditionRegistry::with_defaults(CooldownManager::new());
    let fixture = Fixture::guild();

    let nodes = [
        PreconditionNode::single_with("HasPermission", json!({ "permissions": ["BAN_MEMBER"] })),
        PreconditionNode::single("HasPermission"),
        PreconditionNode::single_with("ClientPermissions", json!({ "permissions": "BAN_MEMBERS" })),
        PreconditionNode::single_with("Cooldown", json!({ "delayy": 5000 })),
        PreconditionNode::single_with("Cooldown", json!({ "delay": 5000, "scpoe": "guild" })),
        PreconditionNode::single("Cooldown"),
    ];
    for node in &nodes {
        let error = fixture.run(&registry, node).await.unwrap_err();
        assert_eq!(error.identifier, Identifier::PreconditionMalformedPayload, "{node:?}");
        assert!(error.is_configuration_defect());
        assert!(error.message.contains("is misconfigured"));
        assert_eq!(
            node.validate().unwrap_err().identifier,
            Identifier::PreconditionMalformedPayload
        );
    }

    // An explicit empty list requires nothing.
    let node = PreconditionNode::single_with("HasPermission", json!({ "permissions": [] }));
    assert_eq!(node.validate(), Ok(()));
    assert_eq!(fixture.run(&registry, &node).await, Ok(()));
}

#[test]
fn test_validate_walks_the_tree() {
    let valid = PreconditionNode::And(vec![
        PreconditionNode::single("GuildOnly"),
        PreconditionNode::Or(vec![
            PreconditionNode::single("OwnerOnly"),
            PreconditionNode::single_with("HasPermission", json!({ "permissions": ["BAN_MEMBERS"] })),
        ]),
        PreconditionNode::single_with("Cooldown", json!({ "delay": 1000 })),
    ]);
    assert_eq!(valid.validate(), Ok(()));

    let nested = PreconditionNode::And(vec![
        PreconditionNode::single("GuildOnly"),
        PreconditionNode::Or(vec![PreconditionNode::single("OwnerOnly"), PreconditionNode::single("HasPermission")]),
    ]);
    let error = nested.validate().unwrap_err();
    assert_eq!(error.precondition, "HasPermission");
    assert_eq!(error.identifier, Identifier::PreconditionMalformedPayload);
}

#[tokio::test]
async fn test_client_permissions_in_dm() {
    let registry = PreconditionRegistry::with_defaults(CooldownManager::new());
    let node = PreconditionNode::single_with(
        "ClientPermissions",
        json!({ "permissions": ["SEND_MESSAGES", "MANAGE_ROLES"] }),
    );

    let error = Fixture::dm().run(&registry, &node).await.unwrap_err();
    assert_eq!(
        error.message,
        "I am missing the following permissions to run this command: Manage Roles"
    );
}

#[tokio::test]
async fn test_enabled_is_global() {
    let registry = PreconditionRegistry::with_defaults(CooldownManager::new());
    let mut fixture = Fixture::guild();

    let globals: Vec<String> = registry
        .globals()
        .iter()
        .map(|precondition| Precondition::name(precondition.as_ref()).to_string())
        .collect();
    assert_eq!(globals, vec!["Enabled".to_string()]);
    assert_eq!(registry.run_global(&fixture.ctx()).await, Ok(()));

    fixture.access.disabled_commands.insert("ban".to_string());
    let error = registry.run_global(&fixture.ctx()).await.unwrap_err();
    assert_eq!(error.identifier, Identifier::CommandDisabled);

    let disabled = Fixture::with_command(
        Channel::dm(205),
        CommandOptions::new("ban").enabled(false),
    );
    assert!(registry.run_global(&disabled.ctx()).await.is_err());
}

#[tokio::test]
async fn test_globals_run_in_position_order() {
    struct Ordered(&'static str, i32, Arc<std::sync::Mutex<Vec<&'static str>>>);

    #[async_trait]
    impl Precondition for Ordered {
        fn name(&self) -> &str {
            self.0
        }

        fn position(&self) -> Option<i32> {
            Some(self.1)
        }

        async fn run(&self, _ctx: &PreconditionContext<'_>) -> PreconditionResult {
            self.2.lock().unwrap().push(self.0);
            Ok(())
        }
    }

    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let registry = empty_registry();
    registry.register(Arc::new(Ordered("Late", 20, Arc::clone(&seen)))).unwrap();
    registry.register(Arc::new(Ordered("Early", 1, Arc::clone(&seen)))).unwrap();
    Probe::register(&registry, "Local", false);

    assert_eq!(registry.run_global(&Fixture::guild().ctx()).await, Ok(()));
    assert_eq!(*seen.lock().unwrap(), vec!["Early", "Late"]);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_buckets() {
    let registry = PreconditionRegistry::with_defaults(CooldownManager::new());
    let fixture = Fixture::guild();
    let node = PreconditionNode::single_with("Cooldown", json!({ "delay": 2000, "scope": "user" }));

    assert_eq!(fixture.run(&registry, &node).await, Ok(()));

    tokio::time::advance(Duration::from_millis(500)).await;
    let error = fixture.run(&registry, &node).await.unwrap_err();
    assert_eq!(error.identifier, Identifier::PreconditionCooldown);
    assert_eq!(error.message, "You have just used this command. Try again in 2 second(s).");
    assert_eq!(error.context, json!({ "remaining": 1500 }));

    tokio::time::advance(Duration::from_millis(1500)).await;
    assert_eq!(fixture.run(&registry, &node).await, Ok(()));
}

#[test]
fn test_entries_build_nodes() {
    let entries: Vec<PreconditionEntry> = serde_json::from_value(json!([
        "GuildOnly",
        { "any": ["OwnerOnly", { "name": "HasPermission", "context": { "permissions": ["BAN_MEMBERS"] } }] },
        { "all": [] }
    ]))
    .unwrap();

    let nodes: Vec<PreconditionNode> = entries.iter().map(PreconditionNode::from).collect();
    assert_eq!(
        nodes,
        vec![
            PreconditionNode::single("GuildOnly"),
            PreconditionNode::Or(vec![
                PreconditionNode::single("OwnerOnly"),
                PreconditionNode::single_with("HasPermission", json!({ "permissions": ["BAN_MEMBERS"] })),
            ]),
            PreconditionNode::And(Vec::new()),
        ]
    );
}
