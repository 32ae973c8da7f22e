use gomoku_server::{game::Role, websockets::MessageType};

mod utils;

use utils::*;

const ALICE: &str = "uuid-alice";
const BOB: &str = "uuid-bob";

#[tokio::test]
async fn test_accepted_new_game_resets_board() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;
    setup.make_move("alice", &room_id, 7, 7, Role::X).await;
    setup.clear_messages().await;

    let ack = setup.propose_new_game("alice", &room_id).await;
    AckAssertion::of(ack)
        .succeeded()
        .with_field("opponent_gone", false);

    MessageAssertion::for_players(&setup, vec!["alice"])
        .received_no_messages()
        .await;
    MessageAssertion::for_players(&setup, vec!["bob"])
        .received_message_type(MessageType::NewGameRequest)
        .await
        .with_room(&room_id)
        .with_player(ALICE);

    let ack = setup.respond_new_game("bob", &room_id, true).await;
    AckAssertion::of(ack).succeeded();

    MessageAssertion::for_players(&setup, vec!["alice", "bob"])
        .received_message_type(MessageType::NewGameStarted)
        .await
        .with_field("turn_number", 1);

    // The cell played before the reset is free again, and X moves first
    let ack = setup.make_move("alice", &room_id, 7, 7, Role::X).await;
    AckAssertion::of(ack).succeeded().with_field("turn_number", 2);
}

#[tokio::test]
async fn test_declined_new_game_keeps_board() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;
    setup.make_move("alice", &room_id, 7, 7, Role::X).await;
    setup.propose_new_game("alice", &room_id).await;
    setup.clear_messages().await;

    let ack = setup.respond_new_game("bob", &room_id, false).await;
    AckAssertion::of(ack).succeeded().with_field("accept", false);

    MessageAssertion::for_players(&setup, vec!["alice"])
        .received_message_type(MessageType::NewGameDeclined)
        .await
        .with_player(BOB);
    MessageAssertion::for_players(&setup, vec!["bob"])
        .received_no_messages()
        .await;

    let ack = setup.make_move("bob", &room_id, 7, 7, Role::O).await;
    AckAssertion::of(ack).failed_with("CellOccupied");
}

#[tokio::test]
async fn test_new_game_without_live_opponent_resets_immediately() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;
    setup.make_move("alice", &room_id, 2, 2, Role::X).await;
    setup.disconnect("bob").await;
    setup.clear_messages().await;

    let ack = setup.propose_new_game("alice", &room_id).await;
    AckAssertion::of(ack)
        .succeeded()
        .with_field("opponent_gone", true);

    MessageAssertion::for_players(&setup, vec!["alice"])
        .received_message_type(MessageType::NewGameStarted)
        .await
        .with_field("turn_number", 1);
}

#[tokio::test]
async fn test_new_game_alone_in_room_resets_immediately() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.create_room("alice").await;
    setup.make_move("alice", &room_id, 0, 0, Role::X).await;
    setup.clear_messages().await;

    let ack = setup.propose_new_game("alice", &room_id).await;
    AckAssertion::of(ack)
        .succeeded()
        .with_field("opponent_gone", true);
}

#[tokio::test]
async fn test_responses_without_pending_proposal_are_rejected() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;

    let ack = setup.respond_new_game("bob", &room_id, true).await;
    AckAssertion::of(ack).failed_with("NoPendingProposal");

    let ack = setup.respond_switch_roles("bob", &room_id, true).await;
    AckAssertion::of(ack).failed_with("NoPendingProposal");

    // A proposer cannot answer their own proposal
    setup.propose_new_game("alice", &room_id).await;
    let ack = setup.respond_new_game("alice", &room_id, true).await;
    AckAssertion::of(ack).failed_with("NoPendingProposal");
}

#[tokio::test]
async fn test_proposal_can_only_be_answered_once() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;

    setup.propose_new_game("alice", &room_id).await;
    let ack = setup.respond_new_game("bob", &room_id, false).await;
    AckAssertion::of(ack).succeeded();

    let ack = setup.respond_new_game("bob", &room_id, true).await;
    AckAssertion::of(ack).failed_with("NoPendingProposal");
}

#[tokio::test]
async fn test_accepted_switch_swaps_roles_for_both() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;

    let ack = setup.propose_switch_roles("alice", &room_id).await;
    AckAssertion::of(ack).succeeded();
    MessageAssertion::for_players(&setup, vec!["bob"])
        .received_message_type(MessageType::SwitchRolesRequest)
        .await
        .with_player(ALICE);

    let ack = setup.respond_switch_roles("bob", &room_id, true).await;
    AckAssertion::of(ack)
        .succeeded()
        .with_field("accepted", true)
        .with_field("role", "X");

    MessageAssertion::for_players(&setup, vec!["alice"])
        .received_message_type(MessageType::SwitchRolesAccepted)
        .await
        .with_field("new_role", "O")
        .with_field("role_map", serde_json::json!({ "X": BOB, "O": ALICE }));
    MessageAssertion::for_players(&setup, vec!["bob"])
        .received_message_type(MessageType::SwitchRolesAccepted)
        .await
        .with_field("new_role", "X");

    // X still moves first, and X now belongs to the other player
    let ack = setup.make_move("alice", &room_id, 0, 0, Role::X).await;
    AckAssertion::of(ack).failed_with("WrongRole");
    let ack = setup.make_move("bob", &room_id, 0, 0, Role::X).await;
    AckAssertion::of(ack).succeeded();
}

#[tokio::test]
async fn test_declined_switch_keeps_roles() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;
    setup.propose_switch_roles("alice", &room_id).await;
    setup.clear_messages().await;

    let ack = setup.respond_switch_roles("bob", &room_id, false).await;
    AckAssertion::of(ack)
        .succeeded()
        .with_field("accepted", false)
        .with_field("role", "O");

    MessageAssertion::for_players(&setup, vec!["alice"])
        .received_message_type(MessageType::SwitchRolesDeclined)
        .await
        .with_player(BOB);
}

#[tokio::test]
async fn test_switch_requires_connected_opponent() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;
    setup.disconnect("bob").await;

    let ack = setup.propose_switch_roles("alice", &room_id).await;
    AckAssertion::of(ack).failed_with("NoOpponent");
}

#[tokio::test]
async fn test_leaving_proposer_cancels_pending_proposal() {
    let mut setup = TestSetupBuilder::new().with_three_players().build().await;
    let room_id = setup.start_two_player_room("alice", "bob").await;
    setup.propose_switch_roles("bob", &room_id).await;

    setup.leave_room("bob", &room_id).await;
    setup.join_room("carol", &room_id).await;

    let ack = setup.respond_switch_roles("alice", &room_id, true).await;
    AckAssertion::of(ack).failed_with("NoPendingProposal");

    // A returning identity after a leave is treated as a newcomer
    setup.connect("bob").await;
    let ack = setup.join_room("bob", &room_id).await;
    AckAssertion::of(ack).failed_with("RoomFull");
}
