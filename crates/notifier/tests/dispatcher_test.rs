#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use todo_domain::entities::ChannelKind;
    use todo_notifier::{MessageChannel, ReminderDispatcher};
    use todo_testing_utils::{MockMessageChannel, TodoBuilder};

    #[test]
    fn test_render_contains_all_display_fields() {
        let due = Utc::now() + Duration::hours(2);
        let todo = TodoBuilder::new()
            .with_title("准备演示")
            .with_priority("high")
            .with_due_date(due)
            .build();

        let message = ReminderDispatcher::render(&todo);

        assert!(message.contains("Reminder: 准备演示"));
        assert!(message.contains(&due.to_rfc2822()));
        assert!(message.contains("Priority: high"));
        assert!(message.contains(&todo.id.to_string()));
    }

    #[test]
    fn test_render_marks_missing_due_date() {
        let todo = TodoBuilder::new().with_title("无截止任务").build();
        let message = ReminderDispatcher::render(&todo);
        assert!(message.contains("Due: no due date"));
    }

    #[tokio::test]
    async fn test_deliver_respects_channel_flags() {
        let telegram = Arc::new(MockMessageChannel::new(ChannelKind::Telegram));
        let discord = Arc::new(MockMessageChannel::new(ChannelKind::Discord));
        let dispatcher = ReminderDispatcher::new(vec![
            telegram.clone() as Arc<dyn MessageChannel>,
            discord.clone() as Arc<dyn MessageChannel>,
        ]);

        let todo = TodoBuilder::new().telegram().build();
        dispatcher.deliver(&todo, "只发Telegram").await;

        assert_eq!(telegram.sent_messages(), vec!["只发Telegram".to_string()]);
        assert!(discord.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_failed_channel_does_not_block_others() {
        let telegram = Arc::new(MockMessageChannel::failing(ChannelKind::Telegram));
        let discord = Arc::new(MockMessageChannel::new(ChannelKind::Discord));
        let dispatcher = ReminderDispatcher::new(vec![
            telegram.clone() as Arc<dyn MessageChannel>,
            discord.clone() as Arc<dyn MessageChannel>,
        ]);

        let todo = TodoBuilder::new().telegram().discord().build();
        dispatcher.deliver(&todo, "两个通道").await;

        assert!(telegram.sent_messages().is_empty());
        assert_eq!(discord.sent_messages(), vec!["两个通道".to_string()]);
    }
}
