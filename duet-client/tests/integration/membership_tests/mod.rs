mod test_participant_events;
