//! End-to-end pipeline tests: mock explorer in, mock Discord out.
//!
//! Exercises the real client, decoder, formatter and notifier together for
//! one poll cycle, including the idempotence of a replayed page.

use mockito::Matcher;

use governor_monitor::{
	models::{DiscordConfig, EventKind, ExplorerConfig, SecretString},
	services::{
		explorer::EtherscanClient,
		notification::DiscordNotifier,
		poller::{poll_event_logs, CursorStore, InMemoryCursorStore},
	},
};

use super::mocks::{link_config, watcher_config, word};

fn explorer_config(api_url: &str) -> ExplorerConfig {
	ExplorerConfig {
		api_url: api_url.to_string(),
		api_key: SecretString::from("test-key"),
		page_size: 1000,
	}
}

fn discord_config(api_url: &str) -> DiscordConfig {
	DiscordConfig {
		api_url: api_url.to_string(),
		bot_token: SecretString::from("test-token"),
		channel_id: "42".to_string(),
	}
}

/// Explorer body with two Minted entries at blocks 100 and 105
fn mint_logs_body() -> String {
	let amount = word("1bc16d674ec80000"); // 2 * 10^18
	let recipient_topic = format!(
		"0x{}",
		word("abcd35cc6634c0532925a3b8d4c9db96c4b4d8b6")
	);
	format!(
		r#"{{"status": "1", "message": "OK", "result": [
			{{"blockNumber": "0x64", "transactionHash": "0xaaa", "data": "0x{amount}", "topics": ["0xsig", "{topic}"]}},
			{{"blockNumber": "0x69", "transactionHash": "0xbbb", "data": "0x{amount}", "topics": ["0xsig", "{topic}"]}}
		]}}"#,
		amount = amount,
		topic = recipient_topic,
	)
}

#[tokio::test]
async fn test_mint_events_flow_from_explorer_to_discord() {
	let mut explorer = mockito::Server::new_async().await;
	explorer
		.mock("GET", "/")
		.match_query(Matcher::Any)
		.with_status(200)
		.with_body(mint_logs_body())
		.create_async()
		.await;

	let mut discord = mockito::Server::new_async().await;
	let discord_mock = discord
		.mock("POST", "/channels/42/messages")
		.match_header("Authorization", "Bot test-token")
		.match_body(Matcher::PartialJsonString(
			r#"{"content": "**2.0** tokens were minted to [0xabcd35cc6634c0532925a3b8d4c9db96c4b4d8b6](https://etherscan.io/address/0xabcd35cc6634c0532925a3b8d4c9db96c4b4d8b6).\n\n**Block Number:** https://etherscan.io/block/100\n**Transaction:** [click here](https://etherscan.io/tx/0xaaa)\n"}"#.to_string(),
		))
		.with_status(200)
		.create_async()
		.await;
	// The second entry lands on the same endpoint with its own body
	let discord_mock_second = discord
		.mock("POST", "/channels/42/messages")
		.match_body(Matcher::Regex("block/105".to_string()))
		.with_status(200)
		.create_async()
		.await;

	let client = EtherscanClient::new(&explorer_config(&explorer.url()));
	let notifier = DiscordNotifier::new(&discord_config(&discord.url())).unwrap();
	let store = InMemoryCursorStore::new();
	let watcher = watcher_config(EventKind::TokensMinted, 90);

	let outcome = poll_event_logs(&watcher, &client, &store, &notifier, &link_config())
		.await
		.unwrap();

	assert_eq!(outcome.emitted, 2);
	assert_eq!(outcome.cursor, 105);
	assert_eq!(store.get_cursor("tokens_minted").await.unwrap(), Some(105));
	discord_mock.assert_async().await;
	discord_mock_second.assert_async().await;
}

#[tokio::test]
async fn test_replayed_page_sends_nothing_to_discord() {
	let mut explorer = mockito::Server::new_async().await;
	explorer
		.mock("GET", "/")
		.match_query(Matcher::Any)
		.with_status(200)
		.with_body(mint_logs_body())
		.expect(2)
		.create_async()
		.await;

	let mut discord = mockito::Server::new_async().await;
	let discord_mock = discord
		.mock("POST", "/channels/42/messages")
		.with_status(200)
		.expect(2) // only the first cycle delivers
		.create_async()
		.await;

	let client = EtherscanClient::new(&explorer_config(&explorer.url()));
	let notifier = DiscordNotifier::new(&discord_config(&discord.url())).unwrap();
	let store = InMemoryCursorStore::new();
	let watcher = watcher_config(EventKind::TokensMinted, 90);
	let links = link_config();

	let first = poll_event_logs(&watcher, &client, &store, &notifier, &links)
		.await
		.unwrap();
	assert_eq!(first.emitted, 2);

	let second = poll_event_logs(&watcher, &client, &store, &notifier, &links)
		.await
		.unwrap();
	assert_eq!(second.emitted, 0);
	assert_eq!(second.cursor, 105);

	discord_mock.assert_async().await;
}

#[tokio::test]
async fn test_explorer_outage_sends_nothing_and_keeps_cursor() {
	let mut explorer = mockito::Server::new_async().await;
	explorer
		.mock("GET", "/")
		.match_query(Matcher::Any)
		.with_status(502)
		.with_body("bad gateway")
		.create_async()
		.await;

	let mut discord = mockito::Server::new_async().await;
	let discord_mock = discord
		.mock("POST", "/channels/42/messages")
		.expect(0)
		.create_async()
		.await;

	let client = EtherscanClient::new(&explorer_config(&explorer.url()));
	let notifier = DiscordNotifier::new(&discord_config(&discord.url())).unwrap();
	let store = InMemoryCursorStore::new();
	store.set_cursor("tokens_minted", 99).await.unwrap();
	let watcher = watcher_config(EventKind::TokensMinted, 90);

	let result = poll_event_logs(&watcher, &client, &store, &notifier, &link_config()).await;

	assert!(result.is_err());
	// Cursor untouched; the next scheduled tick retries from the same place
	assert_eq!(store.get_cursor("tokens_minted").await.unwrap(), Some(99));
	discord_mock.assert_async().await;
}
